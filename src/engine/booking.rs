use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::model::*;
use crate::observability::{BOOKINGS_TOTAL, LOCK_WAIT_SECONDS, outcome_label};

use super::overlap::{check_no_conflict, validate_duration, validate_interval};
use super::{BookingCoordinator, EngineError};

impl BookingCoordinator {
    /// Reserve `[requested_start, requested_start + duration)` for the professional.
    ///
    /// A conflict is an ordinary `Err(EngineError::Conflict(_))`: the caller should
    /// fetch fresh availability and try another slot. `Retryable` means the
    /// booking could not finish within `lock_timeout`, either because the
    /// calendar was contended or because the store was slow.
    pub async fn attempt_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<ConfirmedInterval, EngineError> {
        self.attempt_booking_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// [`attempt_booking`](Self::attempt_booking) that gives up with
    /// [`EngineError::Cancelled`] if `cancel` fires before the insert resolves.
    /// An abandoned attempt writes nothing, provided the store's insert is
    /// cancel-safe (see [`insert_appointment`](super::AppointmentStore::insert_appointment)).
    pub async fn attempt_booking_with_cancel(
        &self,
        request: &BookingRequest,
        cancel: &CancellationToken,
    ) -> Result<ConfirmedInterval, EngineError> {
        let result = self.book(request, cancel).await;
        self.release_idle_lock(request.professional_id);
        metrics::counter!(BOOKINGS_TOTAL, "outcome" => outcome_label(&result)).increment(1);

        let pid = request.professional_id;
        match &result {
            Ok(confirmed) => info!(
                professional_id = %pid,
                appointment_id = %confirmed.appointment_id,
                start = confirmed.interval.start(),
                end = confirmed.interval.end(),
                "booking accepted"
            ),
            Err(EngineError::Conflict(existing)) => warn!(
                professional_id = %pid,
                conflicting = %existing,
                start = request.requested_start,
                "booking rejected: slot no longer available"
            ),
            Err(e @ EngineError::Retryable(_)) => {
                warn!(professional_id = %pid, "booking not attempted: {e}")
            }
            Err(e) => debug!(professional_id = %pid, "booking rejected: {e}"),
        }
        result
    }

    async fn book(
        &self,
        request: &BookingRequest,
        cancel: &CancellationToken,
    ) -> Result<ConfirmedInterval, EngineError> {
        let pid = request.professional_id;
        validate_duration(request.service_duration_minutes)?;
        let requested = TimeInterval::starting_at(request.requested_start, request.service_duration_minutes)
            .ok_or(EngineError::InvalidRequest("timestamp out of range"))?;
        validate_interval(&requested)?;
        if requested.start() < self.clock.now_ms() {
            return Err(EngineError::InvalidRequest("requested start is in the past"));
        }

        let tz = self.config.timezone;
        let window = self.load_window(pid).await?;
        let date = date_of(requested.start(), tz)
            .ok_or(EngineError::InvalidRequest("timestamp out of range"))?;
        if !window.span_on(date, tz).contains(&requested) {
            return Err(EngineError::InvalidRequest("outside working hours"));
        }

        // Critical section: nothing below may be skipped even if the caller
        // just saw this slot in an availability listing. One deadline covers
        // the wait, the re-check read and the insert.
        let lock = self.professional_lock(pid);
        let wait_start = Instant::now();
        let unit = async move {
            let _guard = lock.lock_owned().await;
            metrics::histogram!(LOCK_WAIT_SECONDS).record(wait_start.elapsed().as_secs_f64());
            let booked = self.store.load_booked_intervals(pid, requested).await?;
            check_no_conflict(&requested, &booked)?;

            // Last exit before the commit point.
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let id = self
                .store
                .insert_appointment(pid, requested, request.client_id, request.service_id)
                .await?;
            Ok::<_, EngineError>(id)
        };

        let appointment_id = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EngineError::Cancelled),
            done = tokio::time::timeout(self.config.lock_timeout, unit) => match done {
                Ok(done) => done?,
                Err(_) => {
                    return Err(EngineError::Retryable(format!(
                        "booking for professional {pid} did not finish within {:?}",
                        self.config.lock_timeout
                    )));
                }
            },
        };

        Ok(ConfirmedInterval {
            appointment_id,
            professional_id: pid,
            interval: requested,
            status: AppointmentStatus::Pending,
        })
    }
}
