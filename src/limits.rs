use crate::model::Ms;

/// Longest service the engine will book in one appointment.
pub const MAX_SERVICE_DURATION_MINUTES: u32 = 12 * 60;

/// 2000-01-01T00:00:00Z
pub const MIN_VALID_TIMESTAMP_MS: Ms = 946_684_800_000;

/// 2200-01-01T00:00:00Z
pub const MAX_VALID_TIMESTAMP_MS: Ms = 7_258_118_400_000;
