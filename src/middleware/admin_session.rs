use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};

use crate::auth::{SESSION_COOKIE, hash_session_token};
use crate::error::ApiError;
use crate::models::AppState;

/// Proof of a live admin session. Taking this as a handler argument is what
/// gates an admin route: the cookie must map to a stored, unexpired,
/// unrevoked session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub email: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let jar = CookieJar::from_headers(&parts.headers);
            let token = jar
                .get(SESSION_COOKIE)
                .map(|c| c.value().to_string())
                .filter(|t| !t.is_empty())
                .ok_or_else(ApiError::unauthorized)?;

            let token_hash = hash_session_token(&state.admin.session_secret, &token);

            let session = state
                .sessions
                .find_active(&token_hash, Utc::now())
                .await?
                .ok_or_else(ApiError::unauthorized)?;

            Ok(AdminSession {
                email: session.email,
                token_hash: session.token_hash,
                expires_at: session.expires_at,
            })
        }
    }
}
