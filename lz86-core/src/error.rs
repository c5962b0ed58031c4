use std::path::PathBuf;

use thiserror::Error;

use crate::container::header::HEADER_LEN;
use crate::job::JobState;

#[derive(Error, Debug)]
pub enum Lz86Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("truncated header: need {HEADER_LEN} bytes, found {found}")]
    TruncatedHeader { found: u64 },

    #[error("output buffer too small: capacity {capacity} bytes, need at least {needed}")]
    OutputBufferTooSmall { capacity: usize, needed: usize },

    #[error("encoder failed with status {0}")]
    EncodeFailed(i32),

    #[error("decoder failed with status {0}")]
    DecodeFailed(i32),

    #[error("size mismatch: header declares {expected} bytes, decoded {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("unsupported filter id {0}")]
    UnsupportedFilter(u8),

    #[error("failed to open source {}: {source}", path.display())]
    SourceOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open target {}: {source}", path.display())]
    TargetOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write {} error ({written}/{expected} bytes written): {source}", path.display())]
    IncompleteWrite {
        path: PathBuf,
        written: u64,
        expected: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("a job is already running")]
    JobAlreadyRunning,

    #[error("job cancelled")]
    Cancelled,

    #[error("cannot {action} a job in state {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: JobState,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, Lz86Error>;
