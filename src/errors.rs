use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("invalid parent handle for node: {0}")]
    InvalidParent(String),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("invalid format in {path}:{pos}: {reason}")]
    InvalidFormat {
        path: PathBuf,
        pos: usize,
        reason: String,
    },

    #[error("unclosed section <{name}> opened at {path}:{pos}")]
    UnbalancedSection {
        path: PathBuf,
        name: String,
        pos: usize,
    },

    #[error("unexpected closing tag </{name}> at {path}:{pos}")]
    UnexpectedClose {
        path: PathBuf,
        name: String,
        pos: usize,
    },

    #[error("cycle detected in include chain at: {0}")]
    CycleDetected(PathBuf),

    #[error("internal tree operation failed: {0}")]
    InternalError(String),
}

pub type TreeResult<T> = Result<T, TreeError>;
