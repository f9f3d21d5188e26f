use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::models::User;

/// Create a new user. The password is stored as an Argon2id hash, never in
/// the clear.
pub(crate) fn register(db: &Database, username: &str, password: &str) -> Result<User> {
    let mut user = User::new(username.to_string(), hash_password(password)?);
    let id = db.insert_user(&user)?;
    user.id = Some(id);
    Ok(user)
}

/// Look up a user and verify the password. Unknown usernames and wrong
/// passwords report the same failure.
pub(crate) fn login(db: &Database, username: &str, password: &str) -> Result<User> {
    let user = db
        .get_user_by_username(username)?
        .ok_or(TrackerError::AuthenticationFailed)?;
    if !verify_password(password, &user.password_hash)? {
        return Err(TrackerError::AuthenticationFailed);
    }
    Ok(user)
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| TrackerError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| TrackerError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
