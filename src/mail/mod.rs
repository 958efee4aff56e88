// src/mail/mod.rs
//
// Transactional e-mail. Every send is best-effort: the dispatcher reports
// success as a bool and never hands an error back to the workflow.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::models::{Appointment, AppointmentStatus};

pub mod smtp;
pub mod templates;
#[cfg(test)]
pub mod testing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    PatientConfirmation,
    PatientCancellation,
    AdminNewRequest,
    AdminStatusChange,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::PatientConfirmation => "patient_confirmation",
            NotificationKind::PatientCancellation => "patient_cancellation",
            NotificationKind::AdminNewRequest => "admin_new_request",
            NotificationKind::AdminStatusChange => "admin_status_change",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub kind: NotificationKind,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address {0}")]
    Address(String),
    #[error("message build failed: {0}")]
    Build(String),
    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Composes the four notification kinds and pushes them through the
/// configured transport. A missing transport is not an error.
#[derive(Clone)]
pub struct Notifier {
    mailer: Option<Arc<dyn Mailer>>,
    admin_inbox: String,
    clinic_name: String,
    send_timeout: Duration,
}

impl Notifier {
    pub fn new(
        mailer: Option<Arc<dyn Mailer>>,
        admin_inbox: String,
        clinic_name: String,
        send_timeout: Duration,
    ) -> Self {
        Self {
            mailer,
            admin_inbox,
            clinic_name,
            send_timeout,
        }
    }

    pub async fn patient_confirmation(&self, apt: &Appointment) -> bool {
        self.deliver(templates::patient_confirmation(&self.clinic_name, apt))
            .await
    }

    pub async fn patient_cancellation(&self, apt: &Appointment) -> bool {
        self.deliver(templates::patient_cancellation(&self.clinic_name, apt))
            .await
    }

    pub async fn admin_new_request(&self, apt: &Appointment) -> bool {
        self.deliver(templates::admin_new_request(
            &self.clinic_name,
            &self.admin_inbox,
            apt,
        ))
        .await
    }

    pub async fn admin_status_change(&self, apt: &Appointment, status: AppointmentStatus) -> bool {
        self.deliver(templates::admin_status_change(
            &self.clinic_name,
            &self.admin_inbox,
            apt,
            status,
        ))
        .await
    }

    async fn deliver(&self, email: OutgoingEmail) -> bool {
        let Some(mailer) = &self.mailer else {
            tracing::warn!(
                kind = email.kind.as_str(),
                "mail transport not configured; notification skipped"
            );
            return false;
        };

        match tokio::time::timeout(self.send_timeout, mailer.send(&email)).await {
            Ok(Ok(())) => {
                tracing::info!(kind = email.kind.as_str(), to = %email.to, "notification sent");
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(kind = email.kind.as_str(), to = %email.to, error = %e, "notification failed");
                false
            }
            Err(_) => {
                tracing::warn!(
                    kind = email.kind.as_str(),
                    to = %email.to,
                    timeout_secs = self.send_timeout.as_secs(),
                    "notification timed out"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingMailer;
    use super::*;
    use chrono::Utc;

    fn appointment() -> Appointment {
        Appointment {
            id: "apt_1_abcdefghi".into(),
            full_name: "Jo Lee".into(),
            email: "jo@x.com".into(),
            phone: "5551234567".into(),
            preferred_date: "2999-01-01".into(),
            preferred_time: "9:00 AM".into(),
            message: None,
            status: AppointmentStatus::Confirmed,
            created_at: Utc::now(),
        }
    }

    fn notifier(mailer: Option<Arc<dyn Mailer>>, timeout: Duration) -> Notifier {
        Notifier::new(
            mailer,
            "clinic@clinic.test".into(),
            "SmileCraft Dental".into(),
            timeout,
        )
    }

    #[tokio::test]
    async fn missing_transport_reports_false() {
        let n = notifier(None, Duration::from_secs(1));
        assert!(!n.patient_confirmation(&appointment()).await);
        assert!(!n.admin_new_request(&appointment()).await);
    }

    #[tokio::test]
    async fn routes_patient_and_admin_mail() {
        let mailer = Arc::new(RecordingMailer::default());
        let n = notifier(Some(mailer.clone()), Duration::from_secs(1));

        assert!(n.patient_confirmation(&appointment()).await);
        assert!(n
            .admin_status_change(&appointment(), AppointmentStatus::Confirmed)
            .await);

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "jo@x.com");
        assert_eq!(sent[0].kind, NotificationKind::PatientConfirmation);
        assert_eq!(sent[1].to, "clinic@clinic.test");
        assert_eq!(sent[1].kind, NotificationKind::AdminStatusChange);
    }

    #[tokio::test]
    async fn transport_failure_reports_false() {
        let mailer = Arc::new(RecordingMailer::failing());
        let n = notifier(Some(mailer.clone()), Duration::from_secs(1));
        assert!(!n.patient_cancellation(&appointment()).await);
        assert_eq!(mailer.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_transport_times_out() {
        let mailer = Arc::new(RecordingMailer::stalled(Duration::from_secs(60)));
        let n = notifier(Some(mailer), Duration::from_secs(10));
        assert!(!n.patient_confirmation(&appointment()).await);
    }
}
