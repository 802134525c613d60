use std::time::Duration;

use thiserror::Error;

/// Why an adapter call produced no data.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("device unreachable: {0}")]
    Unreachable(String),
    #[error("adapter fault: {0}")]
    Fault(String),
    #[error("adapter call timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
}

pub type AdapterResult<T> = Result<T, AdapterError>;
