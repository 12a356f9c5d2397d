//! Password hashing and comparison
//!
//! Uses Argon2id. A failed comparison is a plain `false`; callers turn it into
//! `IncorrectPassword` one layer up.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};

use crate::error::AppError;

/// Hash a password using Argon2id with default parameters
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    PasswordService::new().hash(password)
}

/// Compare a candidate password against a stored hash
///
/// # Errors
/// Returns an error only if the stored hash is malformed
pub fn compare_password(candidate: &str, hash: &str) -> Result<bool, AppError> {
    PasswordService::new().compare(candidate, hash)
}

/// Password service for dependency injection
#[derive(Clone, Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for PasswordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordService").finish_non_exhaustive()
    }
}

impl PasswordService {
    /// Create a password service with Argon2id defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a password service with explicit cost parameters.
    ///
    /// Falls back to the defaults when the parameters are rejected.
    #[must_use]
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        match Params::new(memory_kib, iterations, parallelism, None) {
            Ok(params) => Self {
                argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
            },
            Err(_) => Self::default(),
        }
    }

    /// Hash a password
    ///
    /// # Errors
    /// Returns an error if hashing fails
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
    }

    /// Compare a candidate password against a hash
    ///
    /// # Errors
    /// Returns an error if the stored hash is malformed
    pub fn compare(&self, candidate: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

        Ok(self
            .argon2
            .verify_password(candidate.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Spend the same effort as a real comparison when there is no hash to
    /// compare against, so unknown accounts are not distinguishable by timing.
    pub fn compare_against_dummy(&self, candidate: &str) {
        static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

        let dummy = DUMMY_HASH.get_or_init(|| self.hash("dummy-password-never-matches").ok());
        if let Some(hash) = dummy {
            let _ = self.compare(candidate, hash);
        }
    }
}

/// Validate password strength
///
/// Returns `Ok(())` if the password meets requirements:
/// - At least 8 characters
/// - Contains at least one uppercase letter
/// - Contains at least one lowercase letter
/// - Contains at least one digit
///
/// # Errors
/// Returns a validation error naming the first unmet rule
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    let rules: [(bool, &str); 4] = [
        (
            password.chars().count() >= 8,
            "Password must be at least 8 characters long",
        ),
        (
            password.chars().any(char::is_uppercase),
            "Password must contain at least one uppercase letter",
        ),
        (
            password.chars().any(char::is_lowercase),
            "Password must contain at least one lowercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "Password must contain at least one digit",
        ),
    ];

    match rules.iter().find(|(ok, _)| !ok) {
        Some((_, message)) => Err(AppError::Validation((*message).to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PasswordService {
        PasswordService::with_cost(1024, 1, 1)
    }

    #[test]
    fn test_hash_password() {
        let password = "Passw0rd!";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id"));
        // Fresh salt every time
        let hash2 = hash_password(password).unwrap();
        assert_ne!(hash, hash2);
    }

    #[test]
    fn test_compare_password() {
        let service = fast();
        let hash = service.hash("Passw0rd!").unwrap();

        assert!(service.compare("Passw0rd!", &hash).unwrap());
        assert!(!service.compare("Passw0rd?", &hash).unwrap());
    }

    #[test]
    fn test_hash_from_other_params_still_verifies() {
        let hash = fast().hash("Passw0rd!").unwrap();
        assert!(compare_password("Passw0rd!", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(fast().compare("Passw0rd!", "not-a-hash").is_err());
    }

    #[test]
    fn test_dummy_comparison_does_not_panic() {
        fast().compare_against_dummy("anything");
    }

    #[test]
    fn test_validate_password_strength_valid() {
        assert!(validate_password_strength("Passw0rd!").is_ok());
        assert!(validate_password_strength("Abcdefg1").is_ok());
    }

    #[test]
    fn test_validate_password_strength_rules() {
        let cases = [
            ("Short1", "8 characters"),
            ("lowercase123", "uppercase"),
            ("UPPERCASE123", "lowercase"),
            ("NoDigitsHere", "digit"),
        ];

        for (password, expected) in cases {
            match validate_password_strength(password) {
                Err(AppError::Validation(msg)) => assert!(msg.contains(expected), "{password}: {msg}"),
                other => panic!("{password}: unexpected {other:?}"),
            }
        }
    }
}
