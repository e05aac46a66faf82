use std::time::Duration;

/// Errors produced by the generation, partitioning and ingestion pipeline.
///
/// `InvalidArgument` and `SplitMismatch` always indicate a bug in the caller
/// or in the partitioning code and must never be retried. The remaining kinds
/// come from the ingestion boundary and are surfaced as-is.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Split mismatch: {0}")]
    SplitMismatch(#[from] SplitMismatch),

    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    #[error(
        "Timed out after {waited:?} waiting for row count to reach {target} (last seen: {last_seen})"
    )]
    Timeout {
        target: u64,
        last_seen: u64,
        waited: Duration,
    },

    #[error("Row count {observed} exceeds target {target}")]
    OverTarget { target: u64, observed: u64 },
}

/// Describes the first inconsistency found by a split validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitMismatch {
    #[error("expected {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },

    #[error("chunk {chunk} starts at row {actual_start}, expected {expected_start}")]
    ChunkBoundary {
        chunk: usize,
        expected_start: usize,
        actual_start: usize,
    },

    #[error("chunk {chunk} ends at row {end}, past the last row ({len})")]
    ChunkOutOfBounds { chunk: usize, end: usize, len: usize },

    #[error("rows differ at position {index}")]
    Row { index: usize },
}

/// Underlying cause of a transport error, kept so that it shows up
/// in the error's source chain.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

impl Error {
    /// Accepts either an error or a plain message.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Error::Transport(err.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::transport(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::transport(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with `InvalidArgument` unless `cond` holds.
macro_rules! ensure_arg {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::Error::InvalidArgument(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_arg;
