/*!
 * Translation adapter tests with scripted translators
 */

use std::sync::Arc;

use ezhuthu::document::codec::{deserialize, serialize};
use ezhuthu::document::model::BlockType;
use ezhuthu::errors::{ProviderError, TranslationError, TranslationPart};
use ezhuthu::language_utils::Language;
use ezhuthu::providers::{MockTranslator, TranslateRequest};
use ezhuthu::translation::{ContentTranslator, TranslationCache};

use crate::common::{english_document, init_logging, rich_document};

#[tokio::test]
async fn test_translate_englishDocument_shouldProduceTamilParagraphs() {
    init_logging();
    let mock = MockTranslator::working();
    let translator = ContentTranslator::new(mock.clone());

    let result = translator
        .translate_document("Monsoon diary", &english_document())
        .await
        .unwrap();

    assert_eq!(result.source, Language::English);
    assert_eq!(result.target, Language::Tamil);
    assert_eq!(result.title, "[ta] Monsoon diary");

    let texts: Vec<&str> = result.document.blocks.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(texts, vec!["[ta] Monsoon arrives", "[ta] Umbrellas", "[ta] Boats"]);
    assert!(result.document.blocks.iter().all(|b| b.block_type == BlockType::Unstyled));
    assert!(result.document.blocks.iter().all(|b| b.inline_style_ranges.is_empty()));
    assert!(result.document.entity_map.is_empty());
    assert_eq!(deserialize(&result.serialized), result.document);

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.source == Language::English && r.target == Language::Tamil));
}

#[tokio::test]
async fn test_translate_tamilCharacterAnywhere_shouldTranslateToEnglish() {
    let mock = MockTranslator::working();
    let translator = ContentTranslator::new(mock.clone());

    // The only Tamil text is in the body
    let result = translator.translate_document("Diary", &rich_document()).await.unwrap();
    assert_eq!(result.source, Language::Tamil);
    assert_eq!(result.target, Language::English);
    assert_eq!(result.title, "[en] Diary");
}

#[tokio::test]
async fn test_translate_titleFailure_shouldReportTitle() {
    let translator = ContentTranslator::new(MockTranslator::fail_on_call(1));
    let error = translator
        .translate_document("Monsoon diary", &english_document())
        .await
        .unwrap_err();
    assert_eq!(error.part(), TranslationPart::Title);
}

#[tokio::test]
async fn test_translate_bothFailing_shouldReportTitleFirst() {
    let translator = ContentTranslator::new(MockTranslator::failing());
    let error = translator
        .translate_document("Monsoon diary", &english_document())
        .await
        .unwrap_err();
    assert_eq!(error.part(), TranslationPart::Title);
    assert!(matches!(
        error,
        TranslationError::TranslationFailed {
            source: ProviderError::ApiError { status_code: 500, .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_translate_missingTranslatedText_shouldFail() {
    let translator = ContentTranslator::new(MockTranslator::malformed());
    let error = translator
        .translate_document("Monsoon diary", &english_document())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        TranslationError::TranslationFailed {
            source: ProviderError::ParseError(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_translate_emptyTitle_shouldOnlyCallForBody() {
    let mock = MockTranslator::working();
    let translator = ContentTranslator::new(mock.clone());

    let result = translator.translate_document("  ", &english_document()).await.unwrap();
    assert_eq!(result.title, "");
    assert_eq!(mock.request_count(), 1);
    assert_eq!(mock.requests()[0].text, "Monsoon arrives\nUmbrellas\nBoats");
}

#[tokio::test]
async fn test_translate_withCache_shouldReuseEarlierResults() {
    let mock = MockTranslator::working();
    let cache = TranslationCache::new(true);
    let translator = ContentTranslator::new(mock.clone()).with_cache(cache);

    let first = translator.translate_document("Monsoon diary", &english_document()).await.unwrap();
    let second = translator.translate_document("Monsoon diary", &english_document()).await.unwrap();

    assert_eq!(mock.request_count(), 2);
    assert_eq!(first.title, second.title);
    assert_eq!(first.document.plain_text(), second.document.plain_text());
}

#[tokio::test]
async fn test_translate_sharedTranslator_shouldWorkThroughArc() {
    fn shout(request: &TranslateRequest) -> String {
        request.text.to_uppercase()
    }

    let mock = Arc::new(MockTranslator::working().with_custom_response(shout));
    let translator = ContentTranslator::new(mock.clone());

    let stored = serde_json::to_string(&serialize(&english_document())).unwrap();
    let result = translator.translate_serialized("rain", &stored).await.unwrap();

    assert_eq!(result.title, "RAIN");
    assert_eq!(result.document.blocks[0].text, "MONSOON ARRIVES");
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn test_translate_slowTranslator_shouldStillComplete() {
    let translator = ContentTranslator::new(MockTranslator::slow(20));
    let result = translator.translate_document("Monsoon diary", &english_document()).await;
    assert!(result.is_ok());
}
