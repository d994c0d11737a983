/*!
 * Tests for error types and conversions
 */

use std::error::Error;

use ezhuthu::errors::{
    AppError, EditorError, ProviderError, StoreError, TranslationError, TranslationPart, UploadError,
    WorkflowError,
};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "busy".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("503"));
    assert!(display.contains("busy"));
}

#[test]
fn test_translationError_shouldNamePartAndKeepSource() {
    let error = TranslationError::TranslationFailed {
        part: TranslationPart::Body,
        source: ProviderError::ConnectionError("reset".to_string()),
    };
    assert_eq!(error.part(), TranslationPart::Body);
    assert!(format!("{}", error).contains("body"));
    assert!(error.source().is_some());
}

#[test]
fn test_editorError_fromUploadAndTranslation_shouldWrap() {
    let upload: EditorError = UploadError::UploadFailed("403".to_string()).into();
    assert!(matches!(upload, EditorError::Upload(_)));

    let translation: EditorError = TranslationError::TranslationFailed {
        part: TranslationPart::Title,
        source: ProviderError::ParseError("no text".to_string()),
    }
    .into();
    assert!(format!("{}", translation).contains("Failed to translate content"));
}

#[test]
fn test_storeError_fromAnyhow_shouldKeepContextChain() {
    let error: StoreError = anyhow::anyhow!("disk full").context("writing record").into();
    let display = format!("{}", error);
    assert!(display.contains("writing record"));
    assert!(display.contains("disk full"));
}

#[test]
fn test_appError_conversions_shouldPickVariant() {
    let store: AppError = StoreError::NotFound("x".to_string()).into();
    assert!(matches!(store, AppError::Store(_)));

    let workflow: AppError = WorkflowError::InvalidTransition {
        from: "draft".to_string(),
        to: "published".to_string(),
    }
    .into();
    assert!(format!("{}", workflow).contains("'draft' to 'published'"));

    let io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, AppError::File(_)));
}
