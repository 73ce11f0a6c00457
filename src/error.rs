use std::io;
use thiserror::Error;

/// Error type for dispatch queue operations.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// IO error from spawning a worker thread.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A pool with zero workers was requested.
    #[error("dispatch queue requires at least one worker thread")]
    NoWorkers,

    /// A task was dispatched after shutdown began.
    #[error("dispatch queue is shutting down")]
    ShutDown,
}

/// Result type alias for dispatch queue operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
