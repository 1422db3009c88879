use std::path::PathBuf;
use thiserror::Error;

use crate::reader::SeekOrigin;

/// Exit code for successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors (file not found, permission denied, I/O error)
pub const EXIT_ERROR: i32 = 1;

/// Exit code for invalid arguments (bad flags, zero chunk geometry)
pub const EXIT_INVALID_ARGS: i32 = 2;

/// Custom error type for leap
#[derive(Error, Debug)]
pub enum LeapError {
    /// File I/O errors
    #[error("I/O error for '{path}': {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// A chunk request whose offset cannot be combined with its origin
    #[error("invalid seek: offset {offset} from {origin:?}")]
    InvalidSeek { origin: SeekOrigin, offset: i64 },

    /// An operation that needs a background index that has not finished yet
    #[error("{what} not ready yet")]
    IndexNotReady { what: &'static str },

    /// A navigation operation issued before any file was opened
    #[error("no file loaded")]
    NoFile,

    /// Invalid command line arguments
    #[error("{message}")]
    InvalidArgs { message: String },
}

impl LeapError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            LeapError::InvalidArgs { .. } => EXIT_INVALID_ARGS,
            _ => EXIT_ERROR,
        }
    }
}

impl From<std::io::Error> for LeapError {
    fn from(source: std::io::Error) -> Self {
        LeapError::Io {
            source,
            path: PathBuf::new(),
        }
    }
}
