//! Error types for Herdlog.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Herdlog operations.
#[derive(Error, Debug)]
pub enum HerdlogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("project folder is missing {}", .0.display())]
    MissingProjectFile(PathBuf),

    #[error("no video files found in {}", .0.display())]
    NoVideoFiles(PathBuf),

    #[error("no output file selected")]
    NoOutputSelected,

    #[error("the project contains no clips")]
    EmptyTimeline,

    #[error("required tool not found: {0}")]
    ToolNotFound(String),

    #[error("probe failed for {}: {message}", .path.display())]
    Probe { path: PathBuf, message: String },

    #[error("encoder failed: {0}")]
    Encoder(String),

    #[error("export cancelled")]
    Cancelled,

    #[error("invalid timecode: {0}")]
    InvalidTimecode(String),

    #[error("invalid frame rate: {0}")]
    InvalidFrameRate(String),

    #[error("invalid wrapper pattern: {0}")]
    InvalidWrapper(String),

    #[error("timeline error: {0}")]
    Timeline(String),
}

/// Result type alias for Herdlog operations.
pub type Result<T> = std::result::Result<T, HerdlogError>;
