// src/routes/appointment_routes.rs

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::{
    error::ApiError,
    middleware::rate_limit::{RateLimiter, rate_limit_middleware},
    models::{
        AppState, AvailabilityQuery, AvailabilityResponse, SubmitAppointmentRequest,
        SubmitAppointmentResponse,
    },
    validation::{format_date, parse_date},
};

/// Public booking endpoints. Only the submission is rate limited.
pub fn router(limiter: RateLimiter) -> Router<AppState> {
    Router::new()
        .route("/appointments", post(submit_appointment))
        .route_layer(from_fn_with_state(limiter, rate_limit_middleware))
        .route("/appointments/availability", get(availability))
}

/// POST /appointments
pub async fn submit_appointment(
    State(state): State<AppState>,
    payload: Result<Json<SubmitAppointmentRequest>, JsonRejection>,
) -> Result<Json<SubmitAppointmentResponse>, ApiError> {
    let Json(req) = payload?;

    // The admin alert runs detached; dropping the handle does not cancel it.
    let submitted = state.appointments.submit(&req).await?;

    Ok(Json(SubmitAppointmentResponse {
        appointment_id: submitted.appointment.id,
        message: "Appointment request submitted successfully".into(),
    }))
}

/// GET /appointments/availability?date=YYYY-MM-DD
pub async fn availability(
    State(state): State<AppState>,
    Query(q): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let date = q
        .date
        .as_deref()
        .and_then(parse_date)
        .map(format_date)
        .ok_or_else(|| {
            ApiError::BadRequest("VALIDATION_ERROR", "date must be YYYY-MM-DD".into())
        })?;

    let slots = state.appointments.availability(&date).await?;
    Ok(Json(AvailabilityResponse { date, slots }))
}
