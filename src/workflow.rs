// src/workflow.rs
//
// Appointment lifecycle: booking, admin edits and the e-mail side effects
// of status changes. Authorization happens before these calls, in the
// route extractors.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::task::JoinHandle;

use crate::error::ApiError;
use crate::mail::Notifier;
use crate::models::{
    Appointment, AppointmentPatch, AppointmentStatus, NotificationSummary, SlotAvailability,
    SubmitAppointmentRequest, TIME_SLOTS,
};
use crate::store::AppointmentStore;
use crate::validation::{format_date, parse_date, sanitize_text, validate_submission};

#[derive(Clone)]
pub struct AppointmentService {
    store: Arc<dyn AppointmentStore>,
    notifier: Notifier,
}

/// A stored booking plus the detached admin-alert task. Callers on the
/// response path drop the handle; the task keeps running.
pub struct Submitted {
    pub appointment: Appointment,
    pub admin_alert: JoinHandle<bool>,
}

#[derive(Debug)]
pub struct Updated {
    pub appointment: Appointment,
    pub notifications: NotificationSummary,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn AppointmentStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Public booking. Validation and slot errors return before anything is
    /// written; the admin alert never delays or fails the booking.
    pub async fn submit(&self, raw: &SubmitAppointmentRequest) -> Result<Submitted, ApiError> {
        self.submit_on(raw, Local::now().date_naive()).await
    }

    pub async fn submit_on(
        &self,
        raw: &SubmitAppointmentRequest,
        today: NaiveDate,
    ) -> Result<Submitted, ApiError> {
        let fields = validate_submission(raw, today).map_err(ApiError::Validation)?;

        // Advisory: not atomic with the insert below.
        if self
            .store
            .is_slot_booked(&fields.preferred_date, &fields.preferred_time)
            .await?
        {
            return Err(ApiError::Conflict(
                "SLOT_TAKEN",
                "This time slot is already booked. Please select a different date or time."
                    .into(),
            ));
        }

        let appointment = self.store.create(fields).await?;
        tracing::info!(
            appointment_id = %appointment.id,
            date = %appointment.preferred_date,
            time = %appointment.preferred_time,
            "appointment created"
        );

        let notifier = self.notifier.clone();
        let apt = appointment.clone();
        let admin_alert = tokio::spawn(async move {
            let sent = notifier.admin_new_request(&apt).await;
            if sent {
                tracing::info!(appointment_id = %apt.id, "admin alerted of new appointment");
            } else {
                tracing::warn!(appointment_id = %apt.id, "admin alert for new appointment not sent");
            }
            sent
        });

        Ok(Submitted {
            appointment,
            admin_alert,
        })
    }

    /// Booked flag for each offered slot on `date` (canonical `YYYY-MM-DD`).
    pub async fn availability(&self, date: &str) -> Result<Vec<SlotAvailability>, ApiError> {
        let mut slots = Vec::with_capacity(TIME_SLOTS.len());
        for time in TIME_SLOTS {
            let booked = self.store.is_slot_booked(date, time).await?;
            slots.push(SlotAvailability { time, booked });
        }
        Ok(slots)
    }

    pub async fn list(&self) -> Result<Vec<Appointment>, ApiError> {
        Ok(self.store.list().await?)
    }

    /// Partial admin edit. Free-text fields are sanitized; a status change
    /// to confirmed/cancelled notifies the patient and the clinic after the
    /// write has committed.
    pub async fn update(&self, id: &str, patch: AppointmentPatch) -> Result<Updated, ApiError> {
        let original = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(ApiError::appointment_not_found)?;

        let patch = sanitize_patch(patch);
        let appointment = self
            .store
            .update(id, &patch)
            .await?
            .ok_or_else(ApiError::appointment_not_found)?;

        let notifications = match patch.status {
            Some(status) if status != original.status => {
                tracing::info!(
                    appointment_id = %id,
                    from = %original.status,
                    to = %status,
                    "appointment status changed"
                );
                self.notify_status_change(&appointment, status).await
            }
            _ => NotificationSummary::default(),
        };

        Ok(Updated {
            appointment,
            notifications,
        })
    }

    /// Status-only transition. Unlike `update`, repeating the current status
    /// is rejected.
    pub async fn set_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Updated, ApiError> {
        let original = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(ApiError::appointment_not_found)?;

        if original.status == status {
            return Err(ApiError::BadRequest(
                "ALREADY_IN_STATUS",
                format!("Appointment is already {status}"),
            ));
        }

        self.update(
            id,
            AppointmentPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        if !self.store.delete(id).await? {
            return Err(ApiError::appointment_not_found());
        }
        tracing::info!(appointment_id = %id, "appointment deleted");
        Ok(())
    }

    async fn notify_status_change(
        &self,
        apt: &Appointment,
        status: AppointmentStatus,
    ) -> NotificationSummary {
        let patient = match status {
            AppointmentStatus::Confirmed => self.notifier.patient_confirmation(apt).await,
            AppointmentStatus::Cancelled => self.notifier.patient_cancellation(apt).await,
            AppointmentStatus::Pending => return NotificationSummary::default(),
        };
        let admin = self.notifier.admin_status_change(apt, status).await;

        NotificationSummary {
            patient_email_sent: Some(patient),
            admin_email_sent: Some(admin),
        }
    }
}

fn sanitize_patch(patch: AppointmentPatch) -> AppointmentPatch {
    let clean = |v: Option<String>| v.map(|s| sanitize_text(&s));
    AppointmentPatch {
        full_name: clean(patch.full_name),
        email: clean(patch.email),
        phone: clean(patch.phone),
        // Same canonical form as public bookings, so slot checks line up.
        preferred_date: patch
            .preferred_date
            .map(|s| parse_date(&s).map(format_date).unwrap_or_else(|| s.trim().to_string())),
        preferred_time: patch.preferred_time.map(|s| s.trim().to_string()),
        message: patch
            .message
            .map(|m| m.map(|s| sanitize_text(&s)).filter(|s| !s.is_empty())),
        status: patch.status,
    }
}
