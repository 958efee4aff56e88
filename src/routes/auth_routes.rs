use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};

use crate::{
    auth::{SESSION_COOKIE, generate_session_token, hash_session_token},
    error::ApiError,
    middleware::admin_session::AdminSession,
    models::{AppState, LoginRequest, OkResponse, SessionResponse},
    store::SessionRecord,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session))
}

fn session_cookie(token: String, ttl_hours: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .max_age(time::Duration::hours(ttl_hours))
        .build()
}

/// POST /admin/login
/// Checks the configured admin credentials and opens a server-side session.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let Json(req) = payload?;
    let email = req.email.as_deref().unwrap_or_default().trim();
    let password = req.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "email and password are required".into(),
        ));
    }

    if !state.admin.validate(email, password) {
        tracing::warn!(email = %email, "admin login rejected");
        return Err(ApiError::invalid_credentials());
    }

    let token = generate_session_token();
    let now = Utc::now();
    let expires_at = now + Duration::hours(state.session_ttl_hours);

    state
        .sessions
        .create(SessionRecord {
            token_hash: hash_session_token(&state.admin.session_secret, &token),
            email: state.admin.email.clone(),
            created_at: now,
            expires_at,
        })
        .await?;

    tracing::info!(email = %state.admin.email, %expires_at, "admin session opened");

    let cookie = session_cookie(token, state.session_ttl_hours, state.cookie_secure);
    Ok((
        jar.add(cookie),
        Json(SessionResponse {
            email: state.admin.email.clone(),
            expires_at,
        }),
    ))
}

/// POST /admin/logout
/// Always succeeds; revokes the presented session if there is one.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<OkResponse>) {
    if let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        let token_hash = hash_session_token(&state.admin.session_secret, &token);
        match state.sessions.revoke(&token_hash).await {
            Ok(true) => tracing::info!("admin session revoked"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "failed to revoke admin session"),
        }
    }

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, Json(OkResponse { ok: true }))
}

/// GET /admin/session
pub async fn session(admin: AdminSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        email: admin.email,
        expires_at: admin.expires_at,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::test_support::*;

    fn session_cookie_from(res: &axum::http::Response<axum::body::Body>) -> String {
        res.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("admin_session="))
            .expect("session cookie set")
            .to_string()
    }

    #[tokio::test]
    async fn login_sets_hardened_cookie_that_unlocks_admin_routes() {
        let app = TestApp::new();
        let res = app
            .router()
            .oneshot(json_request(
                "POST",
                "/admin/login",
                json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let set_cookie = session_cookie_from(&res);
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
        assert!(set_cookie.contains("Secure"));
        assert!(set_cookie.contains("Path=/"));
        assert!(set_cookie.contains("Max-Age=604800"));

        let body = body_json(res).await;
        assert_eq!(body["email"], ADMIN_EMAIL);
        assert!(body["expiresAt"].is_string());

        let cookie = set_cookie.split(';').next().unwrap().to_string();
        let res = app
            .router()
            .oneshot(empty_request("GET", "/admin/appointments", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::new();
        let res = app
            .router()
            .oneshot(json_request(
                "POST",
                "/admin/login",
                json!({"email": ADMIN_EMAIL, "password": "guess"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(res).await["error"]["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn missing_fields_are_a_bad_request() {
        let app = TestApp::new();
        let res = app
            .router()
            .oneshot(json_request("POST", "/admin/login", json!({"email": ADMIN_EMAIL}), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_revokes_the_session() {
        let app = TestApp::new();
        let cookie = app.admin_cookie().await;

        let res = app
            .router()
            .oneshot(empty_request("GET", "/admin/session", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["email"], ADMIN_EMAIL);

        let res = app
            .router()
            .oneshot(empty_request("POST", "/admin/logout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cleared = session_cookie_from(&res);
        assert!(cleared.contains("Max-Age=0"));

        let res = app
            .router()
            .oneshot(empty_request("GET", "/admin/session", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_without_a_session_still_succeeds() {
        let app = TestApp::new();
        let res = app
            .router()
            .oneshot(empty_request("POST", "/admin/logout", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["ok"], true);
    }
}
