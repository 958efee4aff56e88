use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::AdminCredentials;
use crate::faq::FaqResponder;
use crate::middleware::rate_limit::RateLimiter;
use crate::store::SessionStore;
use crate::workflow::AppointmentService;

#[derive(Clone)]
pub struct AppState {
    pub appointments: AppointmentService,
    pub sessions: Arc<dyn SessionStore>,
    pub admin: AdminCredentials,
    pub rate_limiter: RateLimiter,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub faq: Arc<FaqResponder>,
}

/* -------------------------
   Domain
--------------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub preferred_date: String,
    pub preferred_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated, sanitized fields of a new booking. The store assigns
/// `id`, `created_at` and the initial status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub message: Option<String>,
}

/// Partial update. `None` leaves a field untouched; for `message`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub message: Option<Option<String>>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentPatch {
    pub fn apply_to(&self, apt: &mut Appointment) {
        if let Some(v) = &self.full_name {
            apt.full_name = v.clone();
        }
        if let Some(v) = &self.email {
            apt.email = v.clone();
        }
        if let Some(v) = &self.phone {
            apt.phone = v.clone();
        }
        if let Some(v) = &self.preferred_date {
            apt.preferred_date = v.clone();
        }
        if let Some(v) = &self.preferred_time {
            apt.preferred_time = v.clone();
        }
        if let Some(v) = &self.message {
            apt.message = v.clone();
        }
        if let Some(s) = self.status {
            apt.status = s;
        }
    }
}

/// Half-hour slots offered by the booking form.
pub const TIME_SLOTS: [&str; 12] = [
    "9:00 AM", "9:30 AM", "10:00 AM", "10:30 AM", "11:00 AM", "11:30 AM",
    "2:00 PM", "2:30 PM", "3:00 PM", "3:30 PM", "4:00 PM", "4:30 PM",
];

/* -------------------------
   API DTOs
--------------------------*/

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAppointmentRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAppointmentResponse {
    pub appointment_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub message: Option<Option<String>>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub appointment_id: Option<String>,
    pub new_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentIdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    pub appointment: Appointment,
    pub notifications: NotificationSummary,
}

/// What the update path attempted to send. `None` means no send was due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSummary {
    pub patient_email_sent: Option<bool>,
    pub admin_email_sent: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SlotAvailability {
    pub time: &'static str,
    pub booked: bool,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub date: String,
    pub slots: Vec<SlotAvailability>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub answer: String,
    pub matched_question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/* -------------------------
   Helpers
--------------------------*/

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let absent: UpdateAppointmentRequest =
            serde_json::from_str(r#"{"id":"apt_1"}"#).unwrap();
        assert_eq!(absent.message, None);

        let cleared: UpdateAppointmentRequest =
            serde_json::from_str(r#"{"id":"apt_1","message":null}"#).unwrap();
        assert_eq!(cleared.message, Some(None));

        let set: UpdateAppointmentRequest =
            serde_json::from_str(r#"{"id":"apt_1","message":"hi"}"#).unwrap();
        assert_eq!(set.message, Some(Some("hi".to_string())));
    }

    #[test]
    fn appointment_serializes_camel_case() {
        let apt = Appointment {
            id: "apt_1_abc".into(),
            full_name: "Jo Lee".into(),
            email: "jo@x.com".into(),
            phone: "5551234567".into(),
            preferred_date: "2999-01-01".into(),
            preferred_time: "9:00 AM".into(),
            message: None,
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
        };
        let v = serde_json::to_value(&apt).unwrap();
        assert_eq!(v["fullName"], "Jo Lee");
        assert_eq!(v["preferredTime"], "9:00 AM");
        assert_eq!(v["status"], "pending");
        assert!(v.get("message").is_none());
    }

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("confirmed".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Confirmed));
        assert!("done".parse::<AppointmentStatus>().is_err());
    }
}
