// src/store/memory.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{AppointmentStore, SessionRecord, SessionStore, StoreError, generate_appointment_id};
use crate::models::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};

#[derive(Default)]
pub struct MemoryAppointmentStore {
    pub records: Mutex<Vec<Appointment>>,
    /// When set, every call fails like a lost connection.
    pub fail: AtomicBool,
}

impl MemoryAppointmentStore {
    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn list(&self) -> Result<Vec<Appointment>, StoreError> {
        self.check()?;
        let mut out = self.records.lock().await.clone();
        out.reverse();
        Ok(out)
    }

    async fn create(&self, fields: NewAppointment) -> Result<Appointment, StoreError> {
        self.check()?;
        let now = Utc::now();
        let apt = Appointment {
            id: generate_appointment_id(now),
            full_name: fields.full_name,
            email: fields.email,
            phone: fields.phone,
            preferred_date: fields.preferred_date,
            preferred_time: fields.preferred_time,
            message: fields.message,
            status: AppointmentStatus::Pending,
            created_at: now,
        };
        self.records.lock().await.push(apt.clone());
        Ok(apt)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Appointment>, StoreError> {
        self.check()?;
        Ok(self.records.lock().await.iter().find(|a| a.id == id).cloned())
    }

    async fn update(
        &self,
        id: &str,
        patch: &AppointmentPatch,
    ) -> Result<Option<Appointment>, StoreError> {
        self.check()?;
        let mut records = self.records.lock().await;
        let Some(apt) = records.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        patch.apply_to(apt);
        Ok(Some(apt.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.check()?;
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|a| a.id != id);
        Ok(records.len() != before)
    }

    async fn is_slot_booked(&self, date: &str, time: &str) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.records.lock().await.iter().any(|a| {
            a.preferred_date == date
                && a.preferred_time == time
                && a.status != AppointmentStatus::Cancelled
        }))
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, (SessionRecord, bool)>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: SessionRecord) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .await
            .insert(session.token_hash.clone(), (session, false));
        Ok(())
    }

    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self
            .sessions
            .lock()
            .await
            .get(token_hash)
            .filter(|(s, revoked)| !*revoked && s.expires_at > now)
            .map(|(s, _)| s.clone()))
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(token_hash) {
            Some((_, revoked)) if !*revoked => {
                *revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_inactive(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, (s, revoked)| !*revoked && s.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(date: &str, time: &str) -> NewAppointment {
        NewAppointment {
            full_name: "Jo Lee".into(),
            email: "jo@x.com".into(),
            phone: "5551234567".into(),
            preferred_date: date.into(),
            preferred_time: time.into(),
            message: Some("first visit".into()),
        }
    }

    #[tokio::test]
    async fn create_assigns_pending_status_and_fresh_timestamp() {
        let store = MemoryAppointmentStore::default();
        let started = Utc::now();

        let a = store.create(fields("2999-01-01", "9:00 AM")).await.unwrap();
        let b = store.create(fields("2999-01-01", "9:30 AM")).await.unwrap();

        assert_eq!(a.status, AppointmentStatus::Pending);
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert!(a.created_at >= started);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryAppointmentStore::default();
        let a = store.create(fields("2999-01-01", "9:00 AM")).await.unwrap();
        let b = store.create(fields("2999-01-01", "9:30 AM")).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn update_round_trip_keeps_id_and_created_at() {
        let store = MemoryAppointmentStore::default();
        let created = store.create(fields("2999-01-01", "9:00 AM")).await.unwrap();

        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Confirmed),
            ..Default::default()
        };
        store.update(&created.id, &patch).await.unwrap().unwrap();

        let got = store.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(got.status, AppointmentStatus::Confirmed);
        assert_eq!(got.id, created.id);
        assert_eq!(got.created_at, created.created_at);
        assert_eq!(got.message.as_deref(), Some("first visit"));
    }

    #[tokio::test]
    async fn update_clears_message_only_when_explicit() {
        let store = MemoryAppointmentStore::default();
        let created = store.create(fields("2999-01-01", "9:00 AM")).await.unwrap();

        let rename = AppointmentPatch {
            full_name: Some("Joanna Lee".into()),
            ..Default::default()
        };
        let got = store.update(&created.id, &rename).await.unwrap().unwrap();
        assert_eq!(got.full_name, "Joanna Lee");
        assert_eq!(got.message.as_deref(), Some("first visit"));

        let clear = AppointmentPatch {
            message: Some(None),
            ..Default::default()
        };
        let got = store.update(&created.id, &clear).await.unwrap().unwrap();
        assert_eq!(got.message, None);
    }

    #[tokio::test]
    async fn update_unknown_id_is_none() {
        let store = MemoryAppointmentStore::default();
        let got = store
            .update("apt_missing", &AppointmentPatch::default())
            .await
            .unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn delete_missing_id_leaves_list_untouched() {
        let store = MemoryAppointmentStore::default();
        store.create(fields("2999-01-01", "9:00 AM")).await.unwrap();

        assert!(!store.delete("apt_missing").await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_appointments_free_their_slot() {
        let store = MemoryAppointmentStore::default();
        let a = store.create(fields("2999-01-01", "9:00 AM")).await.unwrap();

        assert!(store.is_slot_booked("2999-01-01", "9:00 AM").await.unwrap());
        assert!(!store.is_slot_booked("2999-01-01", "9:30 AM").await.unwrap());
        // exact string match, no normalization
        assert!(!store.is_slot_booked("2999-01-01", "9:00 am").await.unwrap());

        let cancel = AppointmentPatch {
            status: Some(AppointmentStatus::Cancelled),
            ..Default::default()
        };
        store.update(&a.id, &cancel).await.unwrap();
        assert!(!store.is_slot_booked("2999-01-01", "9:00 AM").await.unwrap());
    }

    #[tokio::test]
    async fn revoked_and_expired_sessions_are_inactive() {
        let store = MemorySessionStore::default();
        let now = Utc::now();
        let live = SessionRecord {
            token_hash: "live".into(),
            email: "admin@clinic.test".into(),
            created_at: now,
            expires_at: now + chrono::Duration::hours(1),
        };
        let stale = SessionRecord {
            token_hash: "stale".into(),
            expires_at: now - chrono::Duration::seconds(1),
            ..live.clone()
        };
        store.create(live.clone()).await.unwrap();
        store.create(stale).await.unwrap();

        assert_eq!(store.find_active("live", now).await.unwrap(), Some(live));
        assert!(store.find_active("stale", now).await.unwrap().is_none());

        assert!(store.revoke("live").await.unwrap());
        assert!(!store.revoke("live").await.unwrap());
        assert!(store.find_active("live", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_drops_only_expired_and_revoked_sessions() {
        let store = MemorySessionStore::default();
        let now = Utc::now();
        let session = |hash: &str, expires_at| SessionRecord {
            token_hash: hash.into(),
            email: "admin@clinic.test".into(),
            created_at: now - chrono::Duration::hours(2),
            expires_at,
        };
        store.create(session("live", now + chrono::Duration::hours(1))).await.unwrap();
        store.create(session("expired", now - chrono::Duration::seconds(1))).await.unwrap();
        store.create(session("edge", now)).await.unwrap();
        store.create(session("revoked", now + chrono::Duration::hours(1))).await.unwrap();
        store.revoke("revoked").await.unwrap();

        assert_eq!(store.purge_inactive(now).await.unwrap(), 3);
        assert!(store.find_active("live", now).await.unwrap().is_some());
        assert_eq!(store.sessions.lock().await.len(), 1);
        assert_eq!(store.purge_inactive(now).await.unwrap(), 0);
    }
}
