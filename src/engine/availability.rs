use crate::model::*;

use super::overlap::first_conflict;

/// Keep the candidate slots whose full service interval fits before `close`,
/// starts no earlier than `not_before`, and overlaps no booked interval.
///
/// `candidates` must be sorted by start; the result keeps that order.
pub fn usable_slots(
    candidates: impl IntoIterator<Item = TimeInterval>,
    close: Ms,
    service_ms: Ms,
    not_before: Ms,
    booked: &[BookedInterval],
) -> Vec<TimeInterval> {
    candidates
        .into_iter()
        .filter(|slot| slot.start() >= not_before)
        .filter(|slot| {
            let Some(full) = TimeInterval::try_new(slot.start(), slot.start() + service_ms) else {
                return false;
            };
            full.end() <= close && first_conflict(&full, booked).is_none()
        })
        .collect()
}

/// Stretches of `open` that no occupying booking covers, in order.
///
/// `booked` may be unsorted, overlapping, or reach past either edge of
/// `open`; cancelled appointments are ignored.
pub fn free_within(open: TimeInterval, booked: &[BookedInterval]) -> Vec<TimeInterval> {
    let mut taken: Vec<TimeInterval> = booked
        .iter()
        .filter(|b| b.status.occupies() && b.interval.overlaps(&open))
        .map(|b| b.interval)
        .collect();
    taken.sort_unstable_by_key(|i| i.start());

    let mut free = Vec::new();
    let mut cursor = open.start();
    for t in taken {
        free.extend(TimeInterval::try_new(cursor, t.start()));
        cursor = cursor.max(t.end());
    }
    free.extend(TimeInterval::try_new(cursor, open.end()));
    free
}
