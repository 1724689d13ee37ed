//! Error types for the worklog pipeline.

use thiserror::Error;

/// A specialized Result type for worklog operations.
pub type WorklogResult<T> = Result<T, WorklogError>;

/// Errors that stop the pipeline.
///
/// Malformed durations and dates are not errors: the parser recovers from
/// them locally and only logs a diagnostic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorklogError {
    /// The tokenizer hit input it could not recover from.
    #[error("lexical error: {message}")]
    Lexical {
        /// Diagnostic carried by the `Error` token.
        message: String,
    },

    /// A stage went away without sending its end-of-stream marker.
    #[error("{stage} stage closed before signalling completion")]
    StreamClosed {
        /// Name of the upstream stage.
        stage: &'static str,
    },
}

impl WorklogError {
    /// Creates a lexical error.
    pub fn lexical(message: impl Into<String>) -> Self {
        WorklogError::Lexical {
            message: message.into(),
        }
    }

    /// Creates a stream-closed error for the named stage.
    pub fn stream_closed(stage: &'static str) -> Self {
        WorklogError::StreamClosed { stage }
    }
}
