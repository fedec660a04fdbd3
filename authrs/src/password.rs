use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rocket::form;

use crate::error::AuthError;

/// Generates a new password hash using argon2.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::PasswordHash(err.to_string()))
}

/// Uses argon2 to verify the password hash against the provided password.
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    let hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::error!("failed to parse password hash: {}", err);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
}

/// Letters, digits and `@.+-_` only.
pub fn validate_username<'v>(username: &str) -> form::Result<'v, ()> {
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(form::Error::validation(
            "Username may only contain letters, digits and @/./+/-/_",
        ))?;
    }

    Ok(())
}

pub fn validate_password<'v>(password: &str) -> form::Result<'v, ()> {
    if password.chars().count() < 8 {
        return Err(form::Error::validation("Password must be at least 8 characters long"))?;
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(form::Error::validation("Password cannot be entirely numeric"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "battery staple"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("not a phc string", "anything"));
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("jane.doe+books").is_ok());
        assert!(validate_username("jane doe").is_err());
        assert!(validate_username("<script>").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("s3cretpass").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("1234567890").is_err());
    }
}
