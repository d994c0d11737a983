/*!
 * Translation of content between the two portal languages.
 */

pub mod adapter;
pub mod cache;

pub use adapter::{ContentTranslator, TranslatedContent, document_from_lines};
pub use cache::TranslationCache;
