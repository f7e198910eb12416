use chrono::NaiveDate;
use tracing::debug;

use crate::model::*;
use crate::observability::AVAILABILITY_QUERIES_TOTAL;

use super::availability::{free_within, usable_slots};
use super::overlap::{validate_duration, validate_interval};
use super::slots::generate;
use super::{BookingCoordinator, EngineError};

impl BookingCoordinator {
    /// Slot starts on `request.date` at which a service of the requested length
    /// could be booked right now, in chronological order.
    ///
    /// The result is a snapshot read without the booking lock. It is not a
    /// reservation: [`BookingCoordinator::attempt_booking`] re-checks on commit.
    pub async fn compute_availability(
        &self,
        request: &AvailabilityRequest,
    ) -> Result<Vec<TimeInterval>, EngineError> {
        validate_duration(request.service_duration_minutes)?;
        let tz = self.config.timezone;
        let day = day_span(request.date, tz);
        validate_interval(&day)?;

        let window = self.load_window(request.professional_id).await?;
        let booked = self
            .store
            .load_booked_intervals(request.professional_id, day)
            .await?;

        let candidates = generate(request.date, &window, tz)?;
        let close = window.span_on(request.date, tz).end();
        let service_ms = Ms::from(request.service_duration_minutes) * MINUTE_MS;
        let free = usable_slots(candidates, close, service_ms, self.clock.now_ms(), &booked);

        metrics::counter!(AVAILABILITY_QUERIES_TOTAL).increment(1);
        debug!(
            professional_id = %request.professional_id,
            date = %request.date,
            booked = booked.len(),
            available = free.len(),
            "computed availability"
        );
        Ok(free)
    }

    /// Unbooked stretches of the working window on `date`.
    pub async fn open_spans(
        &self,
        professional_id: ProfessionalId,
        date: NaiveDate,
    ) -> Result<Vec<TimeInterval>, EngineError> {
        let tz = self.config.timezone;
        let day = day_span(date, tz);
        validate_interval(&day)?;

        let window = self.load_window(professional_id).await?;
        let open = window.span_on(date, tz);
        let booked = self.store.load_booked_intervals(professional_id, open).await?;

        Ok(free_within(open, &booked))
    }
}
