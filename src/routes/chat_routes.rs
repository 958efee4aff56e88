use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    middleware::from_fn_with_state,
    routing::post,
};

use crate::{
    error::ApiError,
    middleware::rate_limit::{RateLimiter, rate_limit_middleware},
    models::{AppState, ChatRequest, ChatResponse},
};

pub fn router(limiter: RateLimiter) -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route_layer(from_fn_with_state(limiter, rate_limit_middleware))
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload?;
    let message = req.message.as_deref().unwrap_or_default().trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "Invalid message".into(),
        ));
    }

    let reply = state.faq.respond(message);
    tracing::debug!(
        matched = reply.matched_question.unwrap_or("-"),
        score = reply.score,
        "chat answered"
    );

    Ok(Json(ChatResponse {
        answer: reply.answer,
        matched_question: reply.matched_question.map(str::to_string),
    }))
}
