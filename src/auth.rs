use argon2::{
    Argon2,
    PasswordHash,
    PasswordVerifier,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

pub const SESSION_COOKIE: &str = "admin_session";

/// The single administrator identity, loaded from config at startup.
#[derive(Clone)]
pub struct AdminCredentials {
    pub email: String,
    /// Argon2 PHC string (see the `hashpass` binary).
    pub password_hash: String,
    /// Keys the stored session-token hashes.
    pub session_secret: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl AdminCredentials {
    /// Exact e-mail match plus Argon2 password verification.
    pub fn validate(&self, email: &str, password: &str) -> bool {
        email == self.email && verify_password(password, &self.password_hash)
    }
}

/// Verify password against an Argon2 PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Opaque session token handed to the browser in the session cookie.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Keyed SHA-256 (hex) of a session token. Only this is persisted.
pub fn hash_session_token(secret: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b":");
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
pub fn hash_password(password: &str) -> String {
    use argon2::PasswordHasher;
    use argon2::password_hash::{SaltString, rand_core::OsRng as PHOsRng};

    let salt = SaltString::generate(&mut PHOsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .expect("argon2 hash")
}
