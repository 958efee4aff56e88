mod auth;
mod config;
mod middleware;

mod db;
mod error;
mod faq;
mod mail;
mod models;
mod routes;
mod store;
mod validation;
mod workflow;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    auth::AdminCredentials,
    config::Config,
    faq::FaqResponder,
    mail::{Mailer, Notifier, smtp::SmtpMailer},
    middleware::rate_limit::RateLimiter,
    models::AppState,
    store::{
        SessionStore,
        pg::{PgAppointmentStore, PgSessionStore},
    },
    workflow::AppointmentService,
};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use axum::http::header;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Config::from_env()?;
    let pool = db::connect_pg(&cfg.database_url).await?;

    let mail_timeout = Duration::from_secs(cfg.mail_timeout_secs);
    let mailer: Option<Arc<dyn Mailer>> = match &cfg.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "smtp transport configured");
            Some(Arc::new(SmtpMailer::from_config(smtp, mail_timeout)?))
        }
        None => {
            tracing::warn!("SMTP not configured; e-mail notifications are disabled");
            None
        }
    };
    let notifier = Notifier::new(
        mailer,
        cfg.admin_notify_email.clone(),
        cfg.clinic_name.clone(),
        mail_timeout,
    );

    let rate_limiter = RateLimiter::new(
        cfg.rate_limit_max,
        Duration::from_secs(cfg.rate_limit_window_secs),
    );
    spawn_rate_limit_sweeper(rate_limiter.clone(), cfg.rate_limit_window_secs);

    let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool.clone()));
    spawn_session_sweeper(sessions.clone());

    let state = AppState {
        appointments: AppointmentService::new(
            Arc::new(PgAppointmentStore::new(pool)),
            notifier,
        ),
        sessions,
        admin: AdminCredentials {
            email: cfg.admin_email.clone(),
            password_hash: cfg.admin_password_hash.clone(),
            session_secret: cfg.session_secret.clone(),
        },
        rate_limiter,
        session_ttl_hours: cfg.session_ttl_hours,
        cookie_secure: cfg.cookie_secure,
        faq: Arc::new(FaqResponder::new(&cfg.clinic_name)),
    };

    // The public booking form may post from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Expired rate-limit windows are dropped once per window length.
fn spawn_rate_limit_sweeper(limiter: RateLimiter, window_secs: u64) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(window_secs.max(1)));
        loop {
            tick.tick().await;
            limiter.purge_stale().await;
        }
    });
}

/// Expired and revoked admin sessions are deleted hourly.
fn spawn_session_sweeper(sessions: Arc<dyn SessionStore>) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60 * 60));
        loop {
            tick.tick().await;
            match sessions.purge_inactive(chrono::Utc::now()).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(purged = n, "admin sessions purged"),
                Err(e) => tracing::warn!(error = %e, "admin session purge failed"),
            }
        }
    });
}
