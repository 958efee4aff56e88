// src/routes/admin_routes.rs
//
// Dashboard endpoints. Every handler takes `AdminSession`, so a request
// without a live session cookie is rejected before any store access.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};

use crate::{
    error::ApiError,
    middleware::admin_session::AdminSession,
    models::{
        AppState, AppointmentIdQuery, AppointmentListResponse, AppointmentPatch,
        AppointmentResponse, AppointmentStatus, OkResponse, SetStatusRequest,
        UpdateAppointmentRequest,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/appointments",
            get(list_appointments)
                .put(update_appointment)
                .delete(delete_appointment),
        )
        .route("/appointments/status", post(set_appointment_status))
}

fn required_id(id: Option<String>) -> Result<String, ApiError> {
    id.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(ApiError::missing_id)
}

/// GET /admin/appointments
pub async fn list_appointments(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<AppointmentListResponse>, ApiError> {
    let appointments = state.appointments.list().await?;
    Ok(Json(AppointmentListResponse { appointments }))
}

/// PUT /admin/appointments
/// Partial edit; a status change to confirmed/cancelled sends e-mail.
pub async fn update_appointment(
    State(state): State<AppState>,
    admin: AdminSession,
    payload: Result<Json<UpdateAppointmentRequest>, JsonRejection>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let Json(req) = payload?;
    let id = required_id(req.id)?;

    let patch = AppointmentPatch {
        full_name: req.full_name,
        email: req.email,
        phone: req.phone,
        preferred_date: req.preferred_date,
        preferred_time: req.preferred_time,
        message: req.message,
        status: req.status,
    };

    let updated = state.appointments.update(&id, patch).await?;
    tracing::info!(appointment_id = %id, admin = %admin.email, "appointment updated");

    Ok(Json(AppointmentResponse {
        appointment: updated.appointment,
        notifications: updated.notifications,
    }))
}

/// POST /admin/appointments/status
pub async fn set_appointment_status(
    State(state): State<AppState>,
    admin: AdminSession,
    payload: Result<Json<SetStatusRequest>, JsonRejection>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let Json(req) = payload?;
    let id = required_id(req.appointment_id)?;
    let status = match req.new_status.as_deref().map(str::parse::<AppointmentStatus>) {
        Some(Ok(s @ (AppointmentStatus::Confirmed | AppointmentStatus::Cancelled))) => s,
        _ => {
            return Err(ApiError::BadRequest(
                "VALIDATION_ERROR",
                "newStatus must be confirmed or cancelled".into(),
            ));
        }
    };

    let updated = state.appointments.set_status(&id, status).await?;
    tracing::info!(appointment_id = %id, admin = %admin.email, status = %status, "status set");

    Ok(Json(AppointmentResponse {
        appointment: updated.appointment,
        notifications: updated.notifications,
    }))
}

/// DELETE /admin/appointments?id=...
pub async fn delete_appointment(
    State(state): State<AppState>,
    admin: AdminSession,
    Query(q): Query<AppointmentIdQuery>,
) -> Result<Json<OkResponse>, ApiError> {
    let id = required_id(q.id)?;
    state.appointments.delete(&id).await?;
    tracing::info!(appointment_id = %id, admin = %admin.email, "appointment removed");
    Ok(Json(OkResponse { ok: true }))
}
