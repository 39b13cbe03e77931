use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Purpose tag carried by session tokens. A token with any other tag is
/// rejected regardless of signature validity.
pub const ACCESS_AUTH: &str = "auth";

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    /// Purpose tag, expected to be `"auth"`.
    pub access: String,
    /// Issuance timestamp (seconds since epoch). Not validated; it only
    /// makes repeated issuances to the same user distinct.
    pub iat: i64,
}

/// Signs and verifies session tokens with a shared HS256 secret.
///
/// Issued tokens carry no expiration: a token stays cryptographically valid
/// until revoked, and revocation is enforced by the user directory's stored
/// token list, not here. The manager is constructed once from configuration
/// and passed down, so token code never reads the environment.
#[derive(Clone)]
pub struct TokenManager {
    secret: String,
}

impl TokenManager {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Produces a signed token embedding the user id and the `"auth"`
    /// purpose tag.
    ///
    /// Issuing does not persist anything; attaching the token to the user's
    /// stored list is the caller's responsibility.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            access: ACCESS_AUTH.to_string(),
            iat: chrono::Utc::now().timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token's signature and payload shape and decodes its claims.
    ///
    /// Fails with `AppError::Unauthorized` if the token is malformed, its
    /// signature does not match, or its purpose tag is not `"auth"`. This is
    /// only the cryptographic half of token validity; presence in the owner's
    /// stored token list is checked separately by the user directory.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        // Tokens carry no exp claim, so expiry checking must be disabled and
        // exp removed from the required claim set.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        if claims.access != ACCESS_AUTH {
            return Err(AppError::Unauthorized("Invalid token: wrong purpose".into()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_issue_and_verify_round_trip() {
        let manager = TokenManager::new("test_secret_for_issue_verify");
        let user_id = Uuid::new_v4();

        let token = manager.issue(user_id).unwrap();
        let claims = manager.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.access, ACCESS_AUTH);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = TokenManager::new("secret_one");
        let verifier = TokenManager::new("secret_two");

        let token = issuer.issue(Uuid::new_v4()).unwrap();
        match verifier.verify(&token) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("Invalid token"));
            }
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let manager = TokenManager::new("test_secret");
        assert!(manager.verify("not.a.token").is_err());
        assert!(manager.verify("").is_err());
    }

    #[test]
    fn test_wrong_purpose_tag_is_rejected() {
        let manager = TokenManager::new("test_secret_for_purpose");

        // Sign a structurally valid token with a different purpose tag.
        let claims = Claims {
            sub: Uuid::new_v4(),
            access: "refresh".to_string(),
            iat: chrono::Utc::now().timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_for_purpose".as_bytes()),
        )
        .unwrap();

        match manager.verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("wrong purpose")),
            other => panic!("Expected Unauthorized for wrong purpose, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_issuance_to_same_user_verifies() {
        let manager = TokenManager::new("test_secret_multi_session");
        let user_id = Uuid::new_v4();

        let first = manager.issue(user_id).unwrap();
        let second = manager.issue(user_id).unwrap();

        // Both sessions resolve to the same user independently.
        assert_eq!(manager.verify(&first).unwrap().sub, user_id);
        assert_eq!(manager.verify(&second).unwrap().sub, user_id);
    }
}
