use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::model::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(Ulid),
    /// The store's own isolation found an overlapping appointment.
    Conflict(AppointmentId),
    /// Transient failure (connection lost, serialization failure, ...).
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "not found: {id}"),
            StoreError::Conflict(id) => write!(f, "overlaps appointment {id}"),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Where a professional's daily working window comes from.
#[async_trait]
pub trait WorkingHoursSource: Send + Sync {
    async fn load_working_window(
        &self,
        professional_id: ProfessionalId,
    ) -> Result<WorkingWindow, StoreError>;
}

/// Appointment persistence as the engine sees it.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Non-cancelled intervals overlapping `range`, ordered by start.
    async fn load_booked_intervals(
        &self,
        professional_id: ProfessionalId,
        range: TimeInterval,
    ) -> Result<Vec<BookedInterval>, StoreError>;

    /// Persist a new `Pending` appointment. Only called inside the
    /// coordinator's per-professional critical section.
    ///
    /// Must be cancel-safe: the coordinator drops this future on timeout or
    /// cancellation, and a dropped insert must leave nothing behind.
    async fn insert_appointment(
        &self,
        professional_id: ProfessionalId,
        interval: TimeInterval,
        client_id: ClientId,
        service_id: ServiceId,
    ) -> Result<AppointmentId, StoreError>;

    async fn update_status(
        &self,
        appointment_id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), StoreError>;
}

// ── In-memory adapter ────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoredAppointment {
    pub booked: BookedInterval,
    pub client_id: ClientId,
    pub service_id: ServiceId,
}

/// One professional's appointments, sorted by `interval.start()`.
/// Cancelled entries stay for history but never occupy time.
#[derive(Debug, Default)]
struct ProfessionalCalendar {
    appointments: Vec<StoredAppointment>,
}

impl ProfessionalCalendar {
    fn insert(&mut self, appt: StoredAppointment) {
        let start = appt.booked.interval.start();
        let pos = self
            .appointments
            .partition_point(|a| a.booked.interval.start() <= start);
        self.appointments.insert(pos, appt);
    }

    /// Occupying appointments whose interval overlaps `query`.
    fn occupying(&self, query: &TimeInterval) -> impl Iterator<Item = &StoredAppointment> {
        // Everything at index >= right_bound starts at or after query.end → can't overlap.
        let right_bound = self
            .appointments
            .partition_point(|a| a.booked.interval.start() < query.end());
        self.appointments[..right_bound]
            .iter()
            .filter(move |a| a.booked.status.occupies() && a.booked.interval.overlaps(query))
    }

    fn get_mut(&mut self, id: &AppointmentId) -> Option<&mut StoredAppointment> {
        self.appointments
            .iter_mut()
            .find(|a| a.booked.appointment_id == *id)
    }
}

type SharedCalendar = Arc<RwLock<ProfessionalCalendar>>;

/// Reference [`AppointmentStore`] backed by process memory.
///
/// Inserts re-check overlap under the calendar's write lock, so the store on
/// its own never admits two overlapping occupying appointments.
#[derive(Default)]
pub struct InMemoryStore {
    calendars: DashMap<ProfessionalId, SharedCalendar>,
    /// Reverse lookup: appointment id → professional id
    appointment_to_professional: DashMap<AppointmentId, ProfessionalId>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn calendar(&self, professional_id: ProfessionalId) -> SharedCalendar {
        self.calendars
            .entry(professional_id)
            .or_default()
            .value()
            .clone()
    }

    pub async fn get(&self, appointment_id: &AppointmentId) -> Option<StoredAppointment> {
        let professional_id = *self.appointment_to_professional.get(appointment_id)?;
        let calendar = self.calendars.get(&professional_id)?.value().clone();
        let guard = calendar.read().await;
        guard
            .appointments
            .iter()
            .find(|a| a.booked.appointment_id == *appointment_id)
            .cloned()
    }

    /// Every appointment for a professional, cancelled ones included.
    pub async fn appointments(&self, professional_id: ProfessionalId) -> Vec<StoredAppointment> {
        let Some(calendar) = self.calendars.get(&professional_id).map(|e| e.value().clone()) else {
            return Vec::new();
        };
        let guard = calendar.read().await;
        guard.appointments.clone()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn load_booked_intervals(
        &self,
        professional_id: ProfessionalId,
        range: TimeInterval,
    ) -> Result<Vec<BookedInterval>, StoreError> {
        let Some(calendar) = self.calendars.get(&professional_id).map(|e| e.value().clone()) else {
            return Ok(Vec::new());
        };
        let guard = calendar.read().await;
        Ok(guard.occupying(&range).map(|a| a.booked.clone()).collect())
    }

    async fn insert_appointment(
        &self,
        professional_id: ProfessionalId,
        interval: TimeInterval,
        client_id: ClientId,
        service_id: ServiceId,
    ) -> Result<AppointmentId, StoreError> {
        let calendar = self.calendar(professional_id);
        let mut guard = calendar.write().await;
        if let Some(existing) = guard.occupying(&interval).next() {
            return Err(StoreError::Conflict(existing.booked.appointment_id));
        }

        let appointment_id = Ulid::new();
        guard.insert(StoredAppointment {
            booked: BookedInterval {
                appointment_id,
                professional_id,
                interval,
                status: AppointmentStatus::Pending,
            },
            client_id,
            service_id,
        });
        self.appointment_to_professional
            .insert(appointment_id, professional_id);
        Ok(appointment_id)
    }

    async fn update_status(
        &self,
        appointment_id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), StoreError> {
        let professional_id = self
            .appointment_to_professional
            .get(&appointment_id)
            .map(|e| *e.value())
            .ok_or(StoreError::NotFound(appointment_id))?;
        let calendar = self.calendar(professional_id);
        let mut guard = calendar.write().await;

        // Reviving a cancelled appointment must not double-book.
        let (current, span) = guard
            .get_mut(&appointment_id)
            .map(|a| (a.booked.status, a.booked.interval))
            .ok_or(StoreError::NotFound(appointment_id))?;
        if !current.occupies()
            && status.occupies()
            && let Some(existing) = guard.occupying(&span).next()
        {
            return Err(StoreError::Conflict(existing.booked.appointment_id));
        }

        if let Some(appt) = guard.get_mut(&appointment_id) {
            appt.booked.status = status;
        }
        Ok(())
    }
}

// ── Static working hours ─────────────────────────────────────────

/// A default window plus per-professional overrides.
pub struct StaticWorkingHours {
    default_window: WorkingWindow,
    overrides: DashMap<ProfessionalId, WorkingWindow>,
}

impl StaticWorkingHours {
    pub fn new(default_window: WorkingWindow) -> Self {
        Self {
            default_window,
            overrides: DashMap::new(),
        }
    }

    pub fn set(&self, professional_id: ProfessionalId, window: WorkingWindow) {
        self.overrides.insert(professional_id, window);
    }

    pub fn clear(&self, professional_id: &ProfessionalId) {
        self.overrides.remove(professional_id);
    }
}

#[async_trait]
impl WorkingHoursSource for StaticWorkingHours {
    async fn load_working_window(
        &self,
        professional_id: ProfessionalId,
    ) -> Result<WorkingWindow, StoreError> {
        Ok(self
            .overrides
            .get(&professional_id)
            .map(|e| *e.value())
            .unwrap_or(self.default_window))
    }
}
