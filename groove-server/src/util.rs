//! Shared utility functions for groove-server

use shared::error::{AppError, ErrorCode};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Password rules for new passwords: min length, at least one digit, confirmation matches.
pub fn check_new_password(password: &str, confirm: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::new(ErrorCode::PasswordMissingDigit));
    }
    if password != confirm {
        return Err(AppError::new(ErrorCode::PasswordMismatch));
    }
    Ok(())
}

/// Lowercase + trim, the form emails are stored and looked up in
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
    }

    #[test]
    fn test_verify_password_with_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_check_new_password() {
        assert!(check_new_password("abcdefg1", "abcdefg1").is_ok());
        assert_eq!(
            check_new_password("abc1", "abc1").unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
        assert_eq!(
            check_new_password("abcdefgh", "abcdefgh").unwrap_err().code,
            ErrorCode::PasswordMissingDigit
        );
        assert_eq!(
            check_new_password("abcdefg1", "abcdefg2").unwrap_err().code,
            ErrorCode::PasswordMismatch
        );
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jan@Example.COM "), "jan@example.com");
    }
}
