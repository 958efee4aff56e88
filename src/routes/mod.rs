use crate::models::AppState;
use axum::Router;

pub mod admin_routes;
pub mod appointment_routes;
pub mod auth_routes;
pub mod chat_routes;

pub fn router(state: AppState) -> Router {
    let limiter = state.rate_limiter.clone();

    Router::new()
        .merge(appointment_routes::router(limiter.clone()))
        .merge(chat_routes::router(limiter))
        .nest(
            "/admin",
            admin_routes::router().merge(auth_routes::router()),
        )
        .with_state(state)
}
