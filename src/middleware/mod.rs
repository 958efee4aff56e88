pub mod admin_session;
pub mod rate_limit;
