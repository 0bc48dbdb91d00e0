//! Fatal generation errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocError {
    #[error("{}: no line matches marker /{pattern}/", file.display())]
    MarkerNotFound { file: PathBuf, pattern: String },

    #[error("{}: marker /{pattern}/ matches {count} lines, expected exactly one", file.display())]
    MarkerAmbiguous {
        file: PathBuf,
        pattern: String,
        count: usize,
    },

    #[error("invalid marker pattern /{pattern}/: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{file}: unresolved type `{ty}` in {function}")]
    UnresolvedType {
        file: String,
        function: String,
        ty: String,
    },

    #[error("{file}: not found in the scanned source tree")]
    MissingSource { file: String },
}
