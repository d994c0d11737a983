/*!
 * # ezhuthu - bilingual rich-text content pipeline
 *
 * Rich-text authoring, storage, rendering and machine translation for a
 * writers' portal that publishes every piece in English and Tamil.
 *
 * ## Architecture
 *
 * - `document`: the rich-text document model
 *   - `document::model`: blocks, inline styles, entities
 *   - `document::commands`: formatting commands returning new documents
 *   - `document::codec`: storage encoding, tolerant of legacy shapes
 * - `render`: sanitizing HTML renderer for read-only display
 * - `content`: bilingual records, display resolution and publication workflow
 * - `translation`: the translation adapter and its cache
 * - `editor`: editing sessions that order edits, uploads and saves
 * - `store`: content store boundary (in-memory and SQLite)
 * - `providers`: translation capability boundary (HTTP and mock)
 * - `assets`: image upload boundary
 * - `app_config`: configuration management
 * - `language_utils`: language detection and ISO code utilities
 * - `errors`: error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod assets;
pub mod content;
pub mod document;
pub mod editor;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod render;
pub mod store;
pub mod translation;

pub use app_config::Config;
pub use content::{ContentRecord, ContentStatus, DisplayContent, Slot, resolve_display};
pub use document::{Document, deserialize, serialize};
pub use editor::EditorController;
pub use errors::{AppError, EditorError, ProviderError, StoreError, TranslationError, UploadError};
pub use language_utils::{Language, detect_language};
pub use render::render_html;
pub use translation::ContentTranslator;
