use std::io;
use std::path::PathBuf;

/// A clipboard backend could not be constructed.
///
/// Cloneable so the process-wide handle can hand the same failure back on
/// every call after a failed setup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Could not set up clipboard: {reason}")]
pub struct SetupError {
    reason: String,
}

impl SetupError {
    pub fn new(reason: impl Into<String>) -> Self {
        SetupError {
            reason: reason.into(),
        }
    }

    /// The original failure description
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Clipboard errors
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} returned code: {code:?} Stderr: {stderr:?} Stdout: {stdout:?}")]
    CommandFailed {
        tool: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("{operation} failed with Windows error code {code}")]
    Native { operation: &'static str, code: i32 },

    #[error("Pasteboard {operation} failed: {message}")]
    Pasteboard {
        operation: &'static str,
        message: String,
    },

    #[error("data must be text or bytes, not {0}")]
    UnsupportedPayload(&'static str),

    #[error(
        "Clipboard contents have no standard formats available. \
         The contents can only be understood by a private program"
    )]
    UnparsableFormat,

    #[error("Clipboard has no text formats available, but text options were specified")]
    NotTextFormat,

    #[error("File-drop paste is only supported for a single file, found {0} entries")]
    MultipleFiles(usize),

    #[error("File-drop data unexpectedly empty")]
    EmptyFileList,

    #[error("Can only paste files, {0:?} is not a regular file")]
    NotAFile(PathBuf),

    #[error("Failed to read dropped file {path:?}: {source}")]
    ReadDroppedFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("The {0} backend cannot list clipboard formats")]
    FormatListingUnsupported(&'static str),

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Unknown error policy: {0}")]
    UnknownErrorPolicy(String),

    #[error("'{encoding}' codec can't decode byte at position {position}")]
    Decode {
        encoding: &'static str,
        position: usize,
    },

    #[error("'{encoding}' codec can't encode character {character:?} at position {position}")]
    Encode {
        encoding: &'static str,
        character: char,
        position: usize,
    },
}

pub type Result<T> = std::result::Result<T, ClipboardError>;
