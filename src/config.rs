use std::env;

use anyhow::{Context, bail};

const MIN_SESSION_SECRET_LEN: usize = 32;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
const MAX_MAIL_TIMEOUT_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub admin_email: String,
    pub admin_password_hash: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub clinic_name: String,
    pub admin_notify_email: String,
    pub smtp: Option<SmtpConfig>,
    pub mail_timeout_secs: u64,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Required secrets have no fallback: a missing one fails startup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let require = |key: &str| -> anyhow::Result<String> {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{key} must be set"))
        };
        let parse_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = require("DATABASE_URL")?;
        let admin_email = require("ADMIN_EMAIL")?;
        let admin_password_hash = require("ADMIN_PASSWORD_HASH")?;
        if !admin_password_hash.starts_with("$argon2") {
            bail!("ADMIN_PASSWORD_HASH must be an Argon2 PHC string (see `hashpass`)");
        }
        let session_secret = require("SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            bail!("SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} characters");
        }

        let bind_addr = parse_or("BIND_ADDR", "127.0.0.1:8080");
        let session_ttl_hours = parse_or("SESSION_TTL_HOURS", "168")
            .parse::<i64>()
            .context("SESSION_TTL_HOURS must be an integer")?;
        let cookie_secure = parse_bool(&parse_or("COOKIE_SECURE", "true"))
            .context("COOKIE_SECURE must be true or false")?;
        let clinic_name = parse_or("CLINIC_NAME", "SmileCraft Dental");
        let admin_notify_email = get("ADMIN_NOTIFY_EMAIL").unwrap_or_else(|| admin_email.clone());
        let mail_timeout_secs = parse_or("MAIL_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .context("MAIL_TIMEOUT_SECS must be an integer")?;
        let rate_limit_max = parse_or("RATE_LIMIT_MAX", "10")
            .parse::<u32>()
            .context("RATE_LIMIT_MAX must be an integer")?;
        let rate_limit_window_secs = parse_or("RATE_LIMIT_WINDOW_SECS", "60")
            .parse::<u64>()
            .context("RATE_LIMIT_WINDOW_SECS must be an integer")?;

        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            bail!("SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}");
        }
        if !(1..=MAX_MAIL_TIMEOUT_SECS).contains(&mail_timeout_secs) {
            bail!("MAIL_TIMEOUT_SECS must be between 1 and {MAX_MAIL_TIMEOUT_SECS}");
        }
        if rate_limit_max == 0 {
            bail!("RATE_LIMIT_MAX must be at least 1");
        }
        if rate_limit_window_secs == 0 {
            bail!("RATE_LIMIT_WINDOW_SECS must be at least 1");
        }

        // Mail is optional; only a fully specified transport is used.
        let smtp = match (get("SMTP_HOST"), get("SMTP_USER"), get("SMTP_PASSWORD")) {
            (Some(host), Some(username), Some(password)) => {
                let port = parse_or("SMTP_PORT", "587")
                    .parse::<u16>()
                    .context("SMTP_PORT must be a port number")?;
                let secure = parse_bool(&parse_or("SMTP_SECURE", "false"))
                    .context("SMTP_SECURE must be true or false")?;
                let from = get("MAIL_FROM").unwrap_or_else(|| username.clone());
                Some(SmtpConfig {
                    host,
                    port,
                    secure,
                    username,
                    password,
                    from,
                })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            admin_email,
            admin_password_hash,
            session_secret,
            session_ttl_hours,
            cookie_secure,
            clinic_name,
            admin_notify_email,
            smtp,
            mail_timeout_secs,
            rate_limit_max,
            rate_limit_window_secs,
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
