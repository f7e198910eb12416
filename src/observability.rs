use crate::engine::EngineError;

/// Counter: availability computations served.
pub const AVAILABILITY_QUERIES_TOTAL: &str = "slotkeeper_availability_queries_total";

/// Counter: booking attempts. Labels: outcome.
pub const BOOKINGS_TOTAL: &str = "slotkeeper_bookings_total";

/// Histogram: time spent waiting for a professional's booking lock, in seconds.
pub const LOCK_WAIT_SECONDS: &str = "slotkeeper_lock_wait_seconds";

/// Map a booking result to a short label for metrics.
pub fn outcome_label<T>(result: &Result<T, EngineError>) -> &'static str {
    match result {
        Ok(_) => "accepted",
        Err(EngineError::Conflict(_)) => "conflict",
        Err(EngineError::Retryable(_)) => "retryable",
        Err(EngineError::Cancelled) => "cancelled",
        Err(EngineError::InvalidRequest(_)) => "invalid_request",
        Err(EngineError::InvalidConfiguration(_)) => "invalid_configuration",
        Err(EngineError::Store(_)) => "store_error",
    }
}
