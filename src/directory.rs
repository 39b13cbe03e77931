//!
//! # User Directory
//!
//! Storage-backed account operations: account creation, credential lookup,
//! token resolution, and token list maintenance. The directory owns the
//! stateful half of token validity: a token only resolves to a user while its
//! literal string is present in that user's stored token list, which is what
//! makes revocation work even though tokens are otherwise self-describing.

use log::debug;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{TokenManager, ACCESS_AUTH};
use crate::error::AppError;
use crate::models::User;

/// Account store with explicit dependencies: a connection pool and the
/// token manager, both constructed at startup and passed in.
#[derive(Clone)]
pub struct UserDirectory {
    pool: PgPool,
    tokens: TokenManager,
}

impl UserDirectory {
    pub fn new(pool: PgPool, tokens: TokenManager) -> Self {
        Self { pool, tokens }
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// Creates a new account with a hashed credential.
    ///
    /// The plaintext password is hashed exactly once, here, before it ever
    /// reaches a query. A duplicate email surfaces as a 400 via the unique
    /// index on `users.email`.
    pub async fn create(&self, email: &str, password: &str) -> Result<User, AppError> {
        let password_hash = hash_password(password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        debug!("created user {}", user.id);
        Ok(user)
    }

    /// Looks up a user by email and verifies the password.
    ///
    /// Fails with one uniform error whether the email is unknown or the
    /// password is wrong, so the response does not reveal whether an
    /// account exists.
    pub async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) if verify_password(password, &user.password_hash) => Ok(user),
            _ => Err(AppError::BadRequest("Invalid email or password".into())),
        }
    }

    /// Resolves a presented token to its owning user.
    ///
    /// Two-phase check: the token manager verifies signature and payload
    /// first, then the literal token string must still be present in the
    /// resolved user's stored token list. A revoked token passes the first
    /// phase and fails the second.
    pub async fn find_by_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.tokens.verify(token)?;

        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.created_at
             FROM users u
             JOIN user_tokens t ON t.user_id = u.id
             WHERE u.id = $1 AND t.token = $2 AND t.access = $3",
        )
        .bind(claims.sub)
        .bind(token)
        .bind(ACCESS_AUTH)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| AppError::Unauthorized("Token not recognized".into()))
    }

    /// Appends a token to the user's stored token list.
    pub async fn attach_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO user_tokens (user_id, access, token) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(ACCESS_AUTH)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes a token from the user's stored token list, revoking it.
    /// Removing a token that is not present is a no-op.
    pub async fn detach_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        debug!(
            "detached {} token(s) for user {}",
            result.rows_affected(),
            user_id
        );
        Ok(())
    }

    /// Issues a fresh token for the user and records it in their token list.
    /// Returns the token string for the caller to hand back in the
    /// `x-auth` response header.
    pub async fn open_session(&self, user_id: Uuid) -> Result<String, AppError> {
        let token = self.tokens.issue(user_id)?;
        self.attach_token(user_id, &token).await?;
        Ok(token)
    }
}
