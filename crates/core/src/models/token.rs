//! Single-use authentication tokens
//!
//! One shape shared by email verification and password reset. Each purpose
//! lives in its own table with its own expiry window; tokens are never
//! deleted, only marked used.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token is for. Purposes never share a table or expiry window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    /// Backing table for this purpose
    pub fn table(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification_tokens",
            TokenPurpose::PasswordReset => "password_reset_tokens",
        }
    }

    /// Validity window in hours
    pub fn ttl_hours(&self) -> i64 {
        match self {
            TokenPurpose::EmailVerification => 24,
            TokenPurpose::PasswordReset => 1,
        }
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenPurpose::EmailVerification => write!(f, "email verification"),
            TokenPurpose::PasswordReset => write!(f, "password reset"),
        }
    }
}

/// A single-use, expiring token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl AuthToken {
    pub fn new(user_id: Uuid, purpose: TokenPurpose) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token: generate_token(),
            created_at: now,
            expires_at: now + chrono::Duration::hours(purpose.ttl_hours()),
            used: false,
        }
    }

    /// Valid iff unused and strictly before expiry. A token checked exactly
    /// at its expiry instant counts as expired.
    pub fn is_valid(&self) -> bool {
        !self.used && Utc::now() < self.expires_at
    }
}

/// Generate an opaque URL-safe token with 32 bytes of entropy
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_url_safe() {
        let token = generate_token();
        assert_eq!(token.len(), 43); // 32 bytes, base64 no-pad
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_fresh_token_is_valid() {
        let token = AuthToken::new(Uuid::new_v4(), TokenPurpose::EmailVerification);
        assert!(token.is_valid());
    }

    #[test]
    fn test_used_token_is_invalid() {
        let mut token = AuthToken::new(Uuid::new_v4(), TokenPurpose::PasswordReset);
        token.used = true;
        assert!(!token.is_valid());
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        // Validity is a strict `now < expires_at`; a token whose expiry is
        // now (or earlier) is already expired.
        let mut token = AuthToken::new(Uuid::new_v4(), TokenPurpose::PasswordReset);
        token.expires_at = Utc::now();
        assert!(!token.is_valid());
    }

    #[test]
    fn test_purpose_windows() {
        assert_eq!(TokenPurpose::EmailVerification.ttl_hours(), 24);
        assert_eq!(TokenPurpose::PasswordReset.ttl_hours(), 1);
    }
}
