use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Source name used when the input did not come from a file.
pub const STRING_SOURCE: &str = "<string>";

/// A syntax or resolution error inside a Lang document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangError {
    /// 1-based source line number where the error occurred.
    pub line: usize,
    pub message: String,
    /// File name, or [`STRING_SOURCE`] for in-memory input.
    pub source: String,
}

impl LangError {
    pub(crate) fn new(line: usize, msg: impl Into<String>, source: impl Into<String>) -> Self {
        Self { line, message: msg.into(), source: source.into() }
    }
}

impl fmt::Display for LangError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source == STRING_SOURCE {
            write!(f, "File {}, line {} - {}", self.source, self.line, self.message)
        } else {
            write!(f, "File \"{}\", line {} - {}", self.source, self.line, self.message)
        }
    }
}

impl std::error::Error for LangError {}

/// Everything that can go wrong while loading a Lang document.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lang(#[from] LangError),

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),

    #[error("{source_name} is not valid {encoding}")]
    Decode { encoding: String, source_name: String },
}

impl Error {
    /// The inner [`LangError`], if this is a document error.
    pub fn as_lang(&self) -> Option<&LangError> {
        match self {
            Error::Lang(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
