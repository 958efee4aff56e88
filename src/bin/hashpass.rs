use anyhow::{Context, anyhow};
use argon2::{Argon2, PasswordHasher};
use argon2::password_hash::{SaltString, rand_core::OsRng};

/// Prints an `ADMIN_PASSWORD_HASH` line for the given password.
fn main() -> anyhow::Result<()> {
    let password = std::env::args()
        .nth(1)
        .context("Usage: hashpass <password>")?;
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hashing failed: {e}"))?
        .to_string();
    println!("ADMIN_PASSWORD_HASH={phc}");
    Ok(())
}
