/*!
 * Translation capability boundary.
 *
 * The portal delegates machine translation to an external function that
 * takes `{text, sourceLang, targetLang}` and answers `{translatedText}`.
 * - `http`: the real endpoint, called over HTTPS
 * - `mock`: scripted behaviours for tests
 */

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::language_utils::Language;

pub mod http;
pub mod mock;

pub use http::HttpTranslator;
pub use mock::{MockBehavior, MockTranslator};

/// One translation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub text: String,
    pub source: Language,
    pub target: Language,
}

impl TranslateRequest {
    pub fn new(text: impl Into<String>, source: Language, target: Language) -> Self {
        Self {
            text: text.into(),
            source,
            target,
        }
    }
}

/// Answer of the translation capability. A missing `translatedText` is a
/// malformed answer and is rejected by the adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranslateResponse {
    #[serde(rename = "translatedText", default)]
    pub translated_text: Option<String>,
}

impl TranslateResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            translated_text: Some(text.into()),
        }
    }
}

/// Something that can translate text between the two content languages
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate one piece of text
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateResponse, ProviderError>;

    /// Check that the capability answers at all
    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.translate(TranslateRequest::new("hello", Language::English, Language::Tamil))
            .await
            .map(|_| ())
    }

    /// Short name used in logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateResponse, ProviderError> {
        (**self).translate(request).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        (**self).test_connection().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
