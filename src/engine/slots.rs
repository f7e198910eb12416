use chrono::{FixedOffset, NaiveDate};

use crate::model::*;

use super::EngineError;

/// Candidate slots `[t, t + granularity)` from the window's opening hour to its
/// closing hour. A trailing slot that would run past closing is dropped, never
/// truncated. Cloning restarts the walk from the current position.
#[derive(Debug, Clone)]
pub struct Slots {
    cursor: Ms,
    close: Ms,
    step: Ms,
}

impl Iterator for Slots {
    type Item = TimeInterval;

    fn next(&mut self) -> Option<TimeInterval> {
        let end = self.cursor + self.step;
        if end > self.close {
            return None;
        }
        let slot = TimeInterval::new(self.cursor, end);
        self.cursor = end;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = ((self.close - self.cursor).max(0) / self.step) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Slots {}

/// Enumerate candidate slots for `date`. Pure: same inputs, same sequence.
pub fn generate(date: NaiveDate, window: &WorkingWindow, tz: FixedOffset) -> Result<Slots, EngineError> {
    window.validate()?;
    let span = window.span_on(date, tz);
    Ok(Slots {
        cursor: span.start(),
        close: span.end(),
        step: window.granularity_ms(),
    })
}
