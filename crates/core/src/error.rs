//! Error types for the subword tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The model configuration file does not exist
    #[error("Tokenizer file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON syntax error in the model configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally invalid model configuration
    #[error("Parse error: {0}")]
    Parse(String),

    /// The model type discriminator names an algorithm we do not implement
    #[error("Unsupported model type: {0}")]
    UnsupportedModel(String),

    /// Token ID outside the loaded vocabulary
    #[error("Token ID {0} is out of range")]
    OutOfRange(u32),

    /// Unknown token string.
    ///
    /// Tokenization never surfaces this; it is resolved to the unknown token.
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Input rejected before tokenization
    #[error("Input too large: {len} bytes (max: {max})")]
    InputTooLarge { len: usize, max: usize },

    /// The dedicated batch thread pool could not be started
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl TokenizerError {
    /// Build a [`TokenizerError::Parse`] from anything displayable.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Whether this error means the configuration content was malformed.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Json(_) | Self::Parse(_))
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
