//! Authentication ports.
//!
//! The core never inspects credentials; it receives a resolved actor id from
//! the boundary. These traits are what the boundary's auth collaborator
//! implements.

use uuid::Uuid;

/// Claims carried by an access token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
    pub exp: i64,
}

/// Token service for issuing and validating access tokens.
pub trait TokenService: Send + Sync {
    /// Generate an access token for a user.
    fn generate_token(&self, user_id: Uuid, username: &str) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Token lifetime in seconds, for the auth response payload.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("missing authorization header")]
    MissingAuth,

    #[error("hashing error: {0}")]
    HashingError(String),
}
