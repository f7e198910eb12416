use std::time::Duration;

use chrono::FixedOffset;

use crate::model::{WindowError, WorkingWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Used for professionals with no window of their own.
    pub default_window: WorkingWindow,
    /// Server timezone all calendar days are resolved in.
    pub timezone: FixedOffset,
    /// Upper bound on one booking's critical section: lock wait, re-check read and insert.
    pub lock_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_window: WorkingWindow::new(9, 17, 30).expect("09-17/30 is a valid window"),
            timezone: FixedOffset::east_opt(0).expect("zero offset is valid"),
            lock_timeout: Duration::from_secs(2),
        }
    }
}

impl EngineConfig {
    /// Read `SLOTKEEPER_*` variables, falling back to defaults for anything unset
    /// or unparseable. The resulting window is still validated.
    pub fn from_env() -> Result<Self, WindowError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WindowError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).and_then(|s| s.trim().parse::<i64>().ok());

        let start_hour: u8 = get("SLOTKEEPER_OPEN_HOUR")
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(defaults.default_window.start_hour());
        let end_hour: u8 = get("SLOTKEEPER_CLOSE_HOUR")
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(defaults.default_window.end_hour());
        let slot_minutes: u32 = get("SLOTKEEPER_SLOT_MINUTES")
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(defaults.default_window.slot_granularity_minutes());
        let timezone = get("SLOTKEEPER_UTC_OFFSET_MINUTES")
            .and_then(|m| m.checked_mul(60))
            .and_then(|secs| i32::try_from(secs).ok())
            .and_then(FixedOffset::east_opt)
            .unwrap_or(defaults.timezone);
        let lock_timeout = get("SLOTKEEPER_LOCK_TIMEOUT_MS")
            .and_then(|ms| u64::try_from(ms).ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.lock_timeout);

        Ok(Self {
            default_window: WorkingWindow::new(start_hour, end_hour, slot_minutes)?,
            timezone,
            lock_timeout,
        })
    }
}
