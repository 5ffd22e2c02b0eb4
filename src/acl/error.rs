//! ACL parse error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or parsing an ACL document.
///
/// Parsing is fail-fast: the first error aborts the parse and no partial
/// rule set is returned.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The ACL file does not exist
    #[error("ACL file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The ACL file exists but could not be read
    #[error("Unable to read file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input bytes are not valid UTF-8 text
    #[error("Unable to decode file {path}: {reason}")]
    Decode { path: String, reason: String },

    /// A `topic` line appeared before any `user` line
    #[error("Line {line}: Topic rule without user context: {text}")]
    TopicWithoutUser { line: usize, text: String },

    /// An access token outside `read`, `write`, `readwrite`
    #[error("Invalid access type: {token}. Must be one of read, write, readwrite")]
    InvalidAccessToken { token: String },

    /// A line matching no grammar rule
    #[error("Line {line}: Invalid ACL syntax: {text}")]
    InvalidSyntax { line: usize, text: String },
}

impl ParseError {
    /// 1-based line number for errors raised by the line grammar
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::TopicWithoutUser { line, .. } | Self::InvalidSyntax { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Whether the error came from the file layer rather than the grammar
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. } | Self::Io { .. } | Self::Decode { .. }
        )
    }
}
