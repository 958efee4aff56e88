// src/store/mod.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::models::{Appointment, AppointmentPatch, NewAppointment};

#[cfg(test)]
pub mod memory;
pub mod pg;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Persistence for appointment records.
///
/// `is_slot_booked` is advisory: it is not evaluated in the same transaction
/// as `create`, so two concurrent bookings for one slot can both succeed.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// All records, newest first.
    async fn list(&self) -> Result<Vec<Appointment>, StoreError>;

    async fn create(&self, fields: NewAppointment) -> Result<Appointment, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Appointment>, StoreError>;

    /// Merges `patch` onto the stored record; `id` and `created_at` never change.
    async fn update(
        &self,
        id: &str,
        patch: &AppointmentPatch,
    ) -> Result<Option<Appointment>, StoreError>;

    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// True if a non-cancelled record holds exactly this date and time.
    async fn is_slot_booked(&self, date: &str, time: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token_hash: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Server-side admin sessions, looked up by token hash.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: SessionRecord) -> Result<(), StoreError>;

    /// Only unexpired, unrevoked sessions are returned.
    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StoreError>;

    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// Deletes expired and revoked sessions; returns how many were removed.
    async fn purge_inactive(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `apt_<unix millis>_<9 base-36 chars>`
pub fn generate_appointment_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("apt_{}_{}", now.timestamp_millis(), suffix)
}
