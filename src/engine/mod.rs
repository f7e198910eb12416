mod availability;
mod booking;
mod error;
mod overlap;
mod queries;
mod slots;
mod store;

pub use availability::{free_within, usable_slots};
pub use error::EngineError;
pub use overlap::{first_conflict, overlaps};
pub use slots::{Slots, generate};
pub use store::{
    AppointmentStore, InMemoryStore, StaticWorkingHours, StoreError, StoredAppointment,
    WorkingHoursSource,
};

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::model::*;

/// Serializes booking commits for one professional.
pub type ProfessionalLock = Arc<Mutex<()>>;

/// Computes availability and admits bookings for professionals.
///
/// Holds no calendar state of its own: appointments live in the
/// [`AppointmentStore`], windows in the [`WorkingHoursSource`]. The only state
/// here is one lock per professional so that re-check and insert run as one
/// unit. Bookings for different professionals never contend.
pub struct BookingCoordinator {
    hours: Arc<dyn WorkingHoursSource>,
    store: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    /// Entries exist only while some attempt holds a clone; see
    /// [`BookingCoordinator::release_idle_lock`].
    locks: DashMap<ProfessionalId, ProfessionalLock>,
}

impl BookingCoordinator {
    pub fn new(
        hours: Arc<dyn WorkingHoursSource>,
        store: Arc<dyn AppointmentStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            hours,
            store,
            clock: Arc::new(SystemClock),
            config,
            locks: DashMap::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(super) fn professional_lock(&self, professional_id: ProfessionalId) -> ProfessionalLock {
        self.locks
            .entry(professional_id)
            .or_default()
            .value()
            .clone()
    }

    /// Drop the professional's lock entry if no attempt still holds it.
    ///
    /// Anyone waiting on or holding the mutex owns a clone, so a count of one
    /// means the map is the only owner and the next attempt can start fresh.
    pub(super) fn release_idle_lock(&self, professional_id: ProfessionalId) {
        self.locks
            .remove_if(&professional_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Load and validate a professional's window.
    pub(super) async fn load_window(
        &self,
        professional_id: ProfessionalId,
    ) -> Result<WorkingWindow, EngineError> {
        let window = self.hours.load_working_window(professional_id).await?;
        window.validate()?;
        Ok(window)
    }
}
