use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Derives a salted bcrypt hash of the given password.
///
/// bcrypt generates a fresh random salt per call, so hashing the same
/// password twice yields different strings. A hashing failure (e.g. the
/// system RNG failing) is surfaced to the caller as an internal error.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks a plaintext password against a stored bcrypt hash.
///
/// Never errors: a malformed stored hash or any bcrypt failure counts as
/// a non-match. bcrypt performs the comparison itself, so the check does
/// not leak timing information about the stored hash.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed));
        assert!(!verify_password("wrong_password", &hashed));
    }

    #[test]
    fn test_hashes_are_salted_per_call() {
        let password = "test_password123";
        let first = hash_password(password).unwrap();
        let second = hash_password(password).unwrap();

        assert_ne!(first, second);
        assert!(verify_password(password, &first));
        assert!(verify_password(password, &second));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        // A malformed stored hash must count as a non-match, not an error.
        assert!(!verify_password("test_password123", "invalidhashformat"));
    }
}
