/*!
 * Error types for the ezhuthu content pipeline.
 *
 * Decoding stored documents never fails (see `document::codec::DecodeIssue`);
 * everything in this module is a failure that crosses a system boundary
 * and must be shown to the caller.
 */

use thiserror::Error;

/// Errors that can occur when calling an external translation capability
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Which of the two translation calls failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationPart {
    Title,
    Body,
}

impl std::fmt::Display for TranslationPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Body => write!(f, "body"),
        }
    }
}

/// Errors that can occur while producing the other-language document
#[derive(Error, Debug)]
pub enum TranslationError {
    /// One of the translation calls failed or returned an unexpected shape.
    /// No partial result is ever produced.
    #[error("Translation of the {part} failed: {source}")]
    TranslationFailed {
        part: TranslationPart,
        #[source]
        source: ProviderError,
    },
}

impl TranslationError {
    /// The part whose translation failed
    pub fn part(&self) -> TranslationPart {
        match self {
            Self::TranslationFailed { part, .. } => *part,
        }
    }
}

/// Errors reported by a content store
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record exists for the id
    #[error("Content not found: {0}")]
    NotFound(String),

    /// The store rejected the write
    #[error("Persist failed: {0}")]
    PersistFailed(String),

    /// The store backend itself failed (connection, schema, I/O)
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        Self::Backend(format!("{:#}", error))
    }
}

/// Errors reported by the asset upload collaborator
#[derive(Error, Debug)]
pub enum UploadError {
    /// The upload was rejected or could not be sent
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Only image assets can be embedded in documents
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
}

/// Errors surfaced by the editor controller. All of them are retryable from
/// the user's point of view; the live document is never discarded.
#[derive(Error, Debug)]
pub enum EditorError {
    /// Loading the record failed
    #[error("Failed to load content: {0}")]
    Load(#[source] StoreError),

    /// Saving the document failed
    #[error("Failed to save content: {0}")]
    Persist(#[source] StoreError),

    /// Uploading an image failed; no entity was created
    #[error("Failed to upload image: {0}")]
    Upload(#[from] UploadError),

    /// Translating the document failed; nothing was written
    #[error("Failed to translate content: {0}")]
    Translation(#[from] TranslationError),
}

/// Errors from the publication workflow
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The requested status change is not allowed from the current status
    #[error("Cannot move content from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    /// The store failed while reading or writing the status
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from the content store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the editor
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Error from the publication workflow
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
