use crate::limits::*;
use crate::model::*;

use super::EngineError;

/// The one overlap test used by the engine. Half-open: `[a, b)` and `[b, c)` do not overlap.
#[inline]
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.overlaps(b)
}

/// First occupying interval in `booked` that overlaps `candidate`.
pub fn first_conflict<'a>(
    candidate: &TimeInterval,
    booked: &'a [BookedInterval],
) -> Option<&'a BookedInterval> {
    booked
        .iter()
        .find(|b| b.status.occupies() && overlaps(candidate, &b.interval))
}

pub(crate) fn check_no_conflict(
    candidate: &TimeInterval,
    booked: &[BookedInterval],
) -> Result<(), EngineError> {
    match first_conflict(candidate, booked) {
        Some(b) => Err(EngineError::Conflict(b.appointment_id)),
        None => Ok(()),
    }
}

pub(crate) fn validate_duration(minutes: u32) -> Result<(), EngineError> {
    if minutes == 0 {
        return Err(EngineError::InvalidRequest("service duration must be positive"));
    }
    if minutes > MAX_SERVICE_DURATION_MINUTES {
        return Err(EngineError::InvalidRequest("service duration too long"));
    }
    Ok(())
}

pub(crate) fn validate_interval(interval: &TimeInterval) -> Result<(), EngineError> {
    if interval.start() < MIN_VALID_TIMESTAMP_MS || interval.end() > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::InvalidRequest("timestamp out of range"));
    }
    Ok(())
}
