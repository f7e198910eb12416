use crate::model::{AppointmentId, WindowError};

use super::store::StoreError;

#[derive(Debug)]
pub enum EngineError {
    /// Bad working-hours setup upstream. Not retried.
    InvalidConfiguration(WindowError),
    /// Malformed caller input. Not retried.
    InvalidRequest(&'static str),
    /// The requested interval overlaps an existing appointment.
    Conflict(AppointmentId),
    /// Contention or a transient store failure; the whole call may be retried.
    Retryable(String),
    /// The caller gave up before the booking committed. Nothing was written.
    Cancelled,
    /// Unexpected store failure.
    Store(String),
}

impl EngineError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Conflict(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Retryable(_))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidConfiguration(e) => write!(f, "invalid working window: {e}"),
            EngineError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            EngineError::Conflict(id) => {
                write!(f, "slot no longer available: conflicts with appointment {id}")
            }
            EngineError::Retryable(msg) => write!(f, "temporarily unavailable: {msg}"),
            EngineError::Cancelled => write!(f, "booking cancelled before commit"),
            EngineError::Store(msg) => write!(f, "store error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<WindowError> for EngineError {
    fn from(e: WindowError) -> Self {
        EngineError::InvalidConfiguration(e)
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(id) => EngineError::Conflict(id),
            StoreError::Unavailable(msg) => EngineError::Retryable(msg),
            StoreError::NotFound(id) => EngineError::Store(format!("not found: {id}")),
        }
    }
}
