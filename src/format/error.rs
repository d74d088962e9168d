//! Error types for save-file operations.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while deriving, reading or writing save files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error on {path:?}: {source}")]
    Io {
        /// File or directory the operation touched
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A save file line could not be parsed
    #[error("Malformed save file at line {line}: {message}")]
    Malformed {
        /// 1-based line number within the file
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// The image does not live under the image root
    #[error("Image {path:?} is not inside image root {root:?}")]
    OutsideRoot {
        /// The offending image path
        path: PathBuf,
        /// The configured image root
        root: PathBuf,
    },
}

impl FormatError {
    /// Create an I/O error tagged with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a malformed-file error for a 1-based line number.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }

    /// Check whether this error came from the filesystem rather than the content.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
