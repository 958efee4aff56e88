// src/store/pg.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{AppointmentStore, SessionRecord, SessionStore, StoreError, generate_appointment_id};
use crate::models::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, sqlx::FromRow)]
struct AppointmentRow {
    id: String,
    full_name: String,
    email: String,
    phone: String,
    preferred_date: String,
    preferred_time: String,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = StoreError;

    fn try_from(r: AppointmentRow) -> Result<Self, Self::Error> {
        let status = r
            .status
            .parse::<AppointmentStatus>()
            .map_err(|reason| StoreError::Corrupt {
                id: r.id.clone(),
                reason,
            })?;
        Ok(Appointment {
            id: r.id,
            full_name: r.full_name,
            email: r.email,
            phone: r.phone,
            preferred_date: r.preferred_date,
            preferred_time: r.preferred_time,
            message: r.message,
            status,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    token_hash: String,
    admin_email: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

const APPOINTMENT_COLUMNS: &str = r#"
    id, full_name, email, phone, preferred_date, preferred_time,
    message, status, created_at
"#;

/* -------------------------
   Appointments
--------------------------*/

#[derive(Clone)]
pub struct PgAppointmentStore {
    db: PgPool,
}

impl PgAppointmentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn list(&self) -> Result<Vec<Appointment>, StoreError> {
        let rows: Vec<AppointmentRow> = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointment ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Appointment::try_from).collect()
    }

    async fn create(&self, fields: NewAppointment) -> Result<Appointment, StoreError> {
        let now = Utc::now();
        let id = generate_appointment_id(now);

        let row: AppointmentRow = sqlx::query_as::<_, AppointmentRow>(&format!(
            r#"
            INSERT INTO appointment (
              id, full_name, email, phone, preferred_date, preferred_time,
              message, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(&fields.full_name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.preferred_date)
        .bind(&fields.preferred_time)
        .bind(fields.message.as_deref())
        .bind(AppointmentStatus::Pending.as_str())
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Appointment>, StoreError> {
        let row: Option<AppointmentRow> = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointment WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Appointment::try_from).transpose()
    }

    async fn update(
        &self,
        id: &str,
        patch: &AppointmentPatch,
    ) -> Result<Option<Appointment>, StoreError> {
        // COALESCE for plain fields; `message` is nullable, so a flag
        // tells "set to NULL" apart from "leave alone".
        let row: Option<AppointmentRow> = sqlx::query_as::<_, AppointmentRow>(&format!(
            r#"
            UPDATE appointment
            SET
              full_name      = COALESCE($2, full_name),
              email          = COALESCE($3, email),
              phone          = COALESCE($4, phone),
              preferred_date = COALESCE($5, preferred_date),
              preferred_time = COALESCE($6, preferred_time),
              message        = CASE WHEN $7 THEN $8 ELSE message END,
              status         = COALESCE($9, status)
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.full_name.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.phone.as_deref())
        .bind(patch.preferred_date.as_deref())
        .bind(patch.preferred_time.as_deref())
        .bind(patch.message.is_some())
        .bind(patch.message.clone().flatten())
        .bind(patch.status.map(AppointmentStatus::as_str))
        .fetch_optional(&self.db)
        .await?;

        row.map(Appointment::try_from).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let res = sqlx::query(r#"DELETE FROM appointment WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn is_slot_booked(&self, date: &str, time: &str) -> Result<bool, StoreError> {
        let booked: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
              SELECT 1
              FROM appointment
              WHERE preferred_date = $1
                AND preferred_time = $2
                AND status <> 'cancelled'
            )
            "#,
        )
        .bind(date)
        .bind(time)
        .fetch_one(&self.db)
        .await?;
        Ok(booked)
    }
}

/* -------------------------
   Admin sessions
--------------------------*/

#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: SessionRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO admin_session (token_hash, admin_email, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.token_hash)
        .bind(&session.email)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let row: Option<SessionRow> = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT token_hash, admin_email, created_at, expires_at
            FROM admin_session
            WHERE token_hash = $1
              AND revoked_at IS NULL
              AND expires_at > $2
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| SessionRecord {
            token_hash: r.token_hash,
            email: r.admin_email,
            created_at: r.created_at,
            expires_at: r.expires_at,
        }))
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE admin_session
            SET revoked_at = now()
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn purge_inactive(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let res = sqlx::query(
            r#"
            DELETE FROM admin_session
            WHERE expires_at <= $1
               OR revoked_at IS NOT NULL
            "#,
        )
        .bind(now)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected())
    }
}
