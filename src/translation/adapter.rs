/*!
 * Produces the other-language variant of a piece of content.
 *
 * Title and body are sent to the translation capability as two independent
 * calls that run concurrently. The result exists only if both succeed; the
 * adapter never writes anything itself, so a failure leaves every stored
 * record as it was.
 *
 * Formatting does not survive translation: the translated body comes back
 * as plain text and is rebuilt as one unstyled paragraph per line.
 */

use log::{debug, info};

use super::cache::TranslationCache;
use crate::document::codec::{deserialize, serialize};
use crate::document::keys::generate_key;
use crate::document::model::{Block, BlockType, Document};
use crate::errors::{ProviderError, TranslationError, TranslationPart};
use crate::language_utils::{Language, detect_language};
use crate::providers::{TranslateRequest, Translator};

/// Translated title and document, ready to be written to the other slot
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedContent {
    pub title: String,
    pub document: Document,
    /// `document` in storage form
    pub serialized: String,
    pub source: Language,
    pub target: Language,
}

/// Translation adapter over any `Translator`
#[derive(Debug)]
pub struct ContentTranslator<T: Translator> {
    translator: T,
    cache: Option<TranslationCache>,
}

impl<T: Translator> ContentTranslator<T> {
    pub fn new(translator: T) -> Self {
        Self {
            translator,
            cache: None,
        }
    }

    /// Reuse earlier results for identical text
    pub fn with_cache(mut self, cache: TranslationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    /// Translate a title and a document in storage form.
    pub async fn translate_serialized(
        &self,
        title: &str,
        serialized: &str,
    ) -> Result<TranslatedContent, TranslationError> {
        let document = deserialize(serialized);
        self.translate_document(title, &document).await
    }

    /// Translate a title and a document.
    ///
    /// The direction is detected from the content: any Tamil character
    /// means Tamil to English, otherwise English to Tamil.
    pub async fn translate_document(
        &self,
        title: &str,
        document: &Document,
    ) -> Result<TranslatedContent, TranslationError> {
        let source = detect_language(&format!("{}\n{}", title, document.plain_text()));
        self.translate_document_between(title, document, source, source.other())
            .await
    }

    /// Translate a title and a document from `source` into `target`, whatever
    /// script the text happens to contain.
    pub async fn translate_document_between(
        &self,
        title: &str,
        document: &Document,
        source: Language,
        target: Language,
    ) -> Result<TranslatedContent, TranslationError> {
        let body = document.plain_text();

        info!(
            "Translating content {} -> {} via {} (title {} chars, body {} chars)",
            source,
            target,
            self.translator.name(),
            title.chars().count(),
            body.chars().count()
        );

        let (title_result, body_result) = futures::join!(
            self.translate_part(TranslationPart::Title, title, source, target),
            self.translate_part(TranslationPart::Body, &body, source, target)
        );
        let translated_title = title_result?;
        let translated_body = body_result?;

        let document = document_from_lines(&translated_body);
        let serialized = serialize(&document);

        Ok(TranslatedContent {
            title: translated_title.trim().to_string(),
            document,
            serialized,
            source,
            target,
        })
    }

    async fn translate_part(
        &self,
        part: TranslationPart,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            debug!("Skipping translation of empty {}", part);
            return Ok(String::new());
        }

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(text, source, target)) {
            return Ok(cached);
        }

        let response = self
            .translator
            .translate(TranslateRequest::new(text, source, target))
            .await
            .map_err(|source| TranslationError::TranslationFailed { part, source })?;

        let translated = response
            .translated_text
            .ok_or_else(|| TranslationError::TranslationFailed {
                part,
                source: ProviderError::ParseError("response has no translatedText".to_string()),
            })?;

        if let Some(cache) = &self.cache {
            cache.store(text, source, target, &translated);
        }
        Ok(translated)
    }
}

/// One unstyled block per non-blank line, each with a fresh key.
pub fn document_from_lines(text: &str) -> Document {
    let mut document = Document::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let key = {
            let taken = document.block_keys();
            generate_key(|candidate| taken.contains(candidate))
        };
        document.blocks.push(Block::new(key, line, BlockType::Unstyled));
    }
    document
}
