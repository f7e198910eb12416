use chrono::{FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds, the only instant type.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;
pub const HOUR_MS: Ms = 60 * MINUTE_MS;
pub const DAY_MS: Ms = 24 * HOUR_MS;

pub type ProfessionalId = Ulid;
pub type ClientId = Ulid;
pub type ServiceId = Ulid;
pub type AppointmentId = Ulid;

/// Half-open interval `[start, end)`. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeInterval {
    start: Ms,
    end: Ms,
}

impl TimeInterval {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "TimeInterval start must be before end");
        Self { start, end }
    }

    /// Like [`TimeInterval::new`] but returns `None` instead of asserting.
    pub fn try_new(start: Ms, end: Ms) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// `[start, start + minutes)`. `None` for a non-positive length.
    pub fn starting_at(start: Ms, minutes: u32) -> Option<Self> {
        let end = start.checked_add(Ms::from(minutes) * MINUTE_MS)?;
        Self::try_new(start, end)
    }

    pub fn start(&self) -> Ms {
        self.start
    }

    pub fn end(&self) -> Ms {
        self.end
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// Half-open overlap. Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Appointment lifecycle as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Whether an appointment in this status holds its interval.
    /// Cancelled appointments never block a slot.
    pub fn occupies(self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

/// The span a persisted appointment occupies on a professional's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookedInterval {
    pub appointment_id: AppointmentId,
    pub professional_id: ProfessionalId,
    pub interval: TimeInterval,
    pub status: AppointmentStatus,
}

/// Daily span during which a professional accepts appointments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingWindow {
    start_hour: u8,
    end_hour: u8,
    slot_granularity_minutes: u32,
}

/// Why a [`WorkingWindow`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    HourOutOfRange(u8),
    EmptyWindow { start_hour: u8, end_hour: u8 },
    ZeroGranularity,
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::HourOutOfRange(h) => write!(f, "hour {h} outside 0..=23"),
            WindowError::EmptyWindow { start_hour, end_hour } => {
                write!(f, "start hour {start_hour} must be before end hour {end_hour}")
            }
            WindowError::ZeroGranularity => write!(f, "slot granularity must be positive"),
        }
    }
}

impl std::error::Error for WindowError {}

impl WorkingWindow {
    pub fn new(start_hour: u8, end_hour: u8, slot_granularity_minutes: u32) -> Result<Self, WindowError> {
        let window = Self {
            start_hour,
            end_hour,
            slot_granularity_minutes,
        };
        window.validate()?;
        Ok(window)
    }

    /// Re-check the invariants. Windows can arrive through serde, which bypasses `new`.
    pub fn validate(&self) -> Result<(), WindowError> {
        for h in [self.start_hour, self.end_hour] {
            if h > 23 {
                return Err(WindowError::HourOutOfRange(h));
            }
        }
        if self.start_hour >= self.end_hour {
            return Err(WindowError::EmptyWindow {
                start_hour: self.start_hour,
                end_hour: self.end_hour,
            });
        }
        if self.slot_granularity_minutes == 0 {
            return Err(WindowError::ZeroGranularity);
        }
        Ok(())
    }

    pub fn start_hour(&self) -> u8 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u8 {
        self.end_hour
    }

    pub fn slot_granularity_minutes(&self) -> u32 {
        self.slot_granularity_minutes
    }

    pub fn granularity_ms(&self) -> Ms {
        Ms::from(self.slot_granularity_minutes) * MINUTE_MS
    }

    /// `[date start_hour:00, date end_hour:00)` in the given offset.
    pub fn span_on(&self, date: NaiveDate, tz: FixedOffset) -> TimeInterval {
        TimeInterval::new(
            instant_at(date, self.start_hour, tz),
            instant_at(date, self.end_hour, tz),
        )
    }
}

/// `[date 00:00, next day 00:00)` in the given offset.
pub fn day_span(date: NaiveDate, tz: FixedOffset) -> TimeInterval {
    let start = instant_at(date, 0, tz);
    TimeInterval::new(start, start + DAY_MS)
}

/// Calendar day containing `t` in the given offset.
pub fn date_of(t: Ms, tz: FixedOffset) -> Option<NaiveDate> {
    let utc = chrono::DateTime::from_timestamp_millis(t)?;
    Some(utc.with_timezone(&tz).date_naive())
}

fn instant_at(date: NaiveDate, hour: u8, tz: FixedOffset) -> Ms {
    let local = date.and_time(NaiveTime::MIN) + chrono::Duration::hours(i64::from(hour));
    // A fixed offset has no gaps or folds, so the local time maps to one instant.
    (local - tz).and_utc().timestamp_millis()
}

/// Input to availability computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub professional_id: ProfessionalId,
    pub date: NaiveDate,
    pub service_duration_minutes: u32,
}

/// Input to a booking attempt. The requested interval is
/// `[requested_start, requested_start + service_duration_minutes)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub professional_id: ProfessionalId,
    pub client_id: ClientId,
    pub service_id: ServiceId,
    pub requested_start: Ms,
    pub service_duration_minutes: u32,
}

/// A booking accepted by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmedInterval {
    pub appointment_id: AppointmentId,
    pub professional_id: ProfessionalId,
    pub interval: TimeInterval,
    pub status: AppointmentStatus,
}
