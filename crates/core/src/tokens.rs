//! Single-use token lifecycle
//!
//! Issues and redeems the expiring tokens behind email verification and
//! password reset. Issuing invalidates any still-outstanding tokens of the
//! same purpose in the same transaction as the insert, so a crash between
//! the two steps cannot leave two simultaneously valid tokens. Consuming
//! commits the purpose effect and the used flag together.

use rusqlite::Connection;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::invariants::assert_token_invariants;
use crate::models::{AuthToken, TokenPurpose, User};
use crate::storage::{AuthTokenStore, Database, UserStore};

pub struct TokenService<'a> {
    db: &'a Database,
}

impl<'a> TokenService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Issue a fresh token for a user, invalidating any unused tokens of the
    /// same purpose first. Returns the raw opaque string for embedding in an
    /// out-of-band link; this service never sends the notification itself.
    #[instrument(skip(self))]
    pub fn issue(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<String> {
        let tx = self.db.transaction()?;

        if UserStore::new(&tx).find_by_id(user_id)?.is_none() {
            return Err(Error::UserNotFound);
        }

        let tokens = AuthTokenStore::new(&tx, purpose);
        let stale = tokens.invalidate_unused_for_user(user_id)?;

        let token = AuthToken::new(user_id, purpose);
        assert_token_invariants(&token);
        tokens.create(&token)?;

        tx.commit()?;

        info!(%user_id, %purpose, stale, "Token issued");
        Ok(token.token)
    }

    /// Redeem an email verification token, marking the user's address
    /// verified. Returns the verified user.
    #[instrument(skip(self, token))]
    pub fn verify_email(&self, token: &str) -> Result<User> {
        self.consume(token, TokenPurpose::EmailVerification, |conn, user| {
            UserStore::new(conn).set_email_verified(user.id)
        })
    }

    /// Redeem a password reset token, installing the given password hash.
    /// Returns the updated user.
    #[instrument(skip(self, token, password_hash))]
    pub fn reset_password(&self, token: &str, password_hash: &str) -> Result<User> {
        self.consume(token, TokenPurpose::PasswordReset, |conn, user| {
            UserStore::new(conn).update_password_hash(user.id, password_hash)
        })
    }

    /// Look up a token, check validity, then apply the purpose effect and
    /// mark the token used, all inside one transaction.
    ///
    /// Used and expired tokens both surface as `TokenInvalid`; callers must
    /// not learn which, so a probing client cannot distinguish them.
    fn consume<F>(&self, token: &str, purpose: TokenPurpose, effect: F) -> Result<User>
    where
        F: FnOnce(&Connection, &User) -> Result<()>,
    {
        let tx = self.db.transaction()?;

        let tokens = AuthTokenStore::new(&tx, purpose);
        let row = tokens.find_by_token(token)?.ok_or(Error::TokenNotFound)?;

        if !row.is_valid() {
            info!(%purpose, user_id = %row.user_id, used = row.used, "Rejected stale token");
            return Err(Error::TokenInvalid);
        }

        let users = UserStore::new(&tx);
        let user = users.find_by_id(row.user_id)?.ok_or(Error::UserNotFound)?;

        effect(&tx, &user)?;
        tokens.mark_used(row.id)?;

        // Re-read so the caller sees the effect applied
        let user = users.find_by_id(row.user_id)?.ok_or(Error::UserNotFound)?;

        tx.commit()?;

        info!(%purpose, user_id = %user.id, "Token consumed");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_user(db: &Database) -> Uuid {
        let user = User::new("alice".into(), "alice@example.com".into(), "hash".into());
        db.users().create(&user).unwrap();
        user.id
    }

    #[test]
    fn test_issue_and_verify_email() {
        let db = Database::open_in_memory().unwrap();
        let service = TokenService::new(&db);
        let user_id = make_user(&db);

        let token = service
            .issue(user_id, TokenPurpose::EmailVerification)
            .unwrap();
        let user = service.verify_email(&token).unwrap();

        assert!(user.email_verified);
        assert!(db.users().find_by_id(user_id).unwrap().unwrap().email_verified);
    }

    #[test]
    fn test_issue_requires_existing_user() {
        let db = Database::open_in_memory().unwrap();
        let service = TokenService::new(&db);

        assert!(matches!(
            service.issue(Uuid::new_v4(), TokenPurpose::PasswordReset),
            Err(Error::UserNotFound)
        ));
    }

    #[test]
    fn test_consume_is_single_use() {
        let db = Database::open_in_memory().unwrap();
        let service = TokenService::new(&db);
        let user_id = make_user(&db);

        let token = service.issue(user_id, TokenPurpose::PasswordReset).unwrap();
        service.reset_password(&token, "new-hash").unwrap();

        // Second redemption always fails, expiry notwithstanding
        assert!(matches!(
            service.reset_password(&token, "other-hash"),
            Err(Error::TokenInvalid)
        ));

        // The first redemption's effect stands
        let user = db.users().find_by_id(user_id).unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
    }

    #[test]
    fn test_issuing_invalidates_outstanding_tokens() {
        let db = Database::open_in_memory().unwrap();
        let service = TokenService::new(&db);
        let user_id = make_user(&db);

        let first = service
            .issue(user_id, TokenPurpose::EmailVerification)
            .unwrap();
        let second = service
            .issue(user_id, TokenPurpose::EmailVerification)
            .unwrap();

        // The earlier token is dead even though its expiry has not passed
        assert!(matches!(
            service.verify_email(&first),
            Err(Error::TokenInvalid)
        ));
        service.verify_email(&second).unwrap();
    }

    #[test]
    fn test_purposes_are_isolated() {
        let db = Database::open_in_memory().unwrap();
        let service = TokenService::new(&db);
        let user_id = make_user(&db);

        let verification = service
            .issue(user_id, TokenPurpose::EmailVerification)
            .unwrap();

        // A verification token is unknown to the reset namespace
        assert!(matches!(
            service.reset_password(&verification, "hash"),
            Err(Error::TokenNotFound)
        ));

        // And issuing a reset token does not invalidate it
        service.issue(user_id, TokenPurpose::PasswordReset).unwrap();
        service.verify_email(&verification).unwrap();
    }

    #[test]
    fn test_unknown_token_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let service = TokenService::new(&db);

        assert!(matches!(
            service.verify_email("no-such-token"),
            Err(Error::TokenNotFound)
        ));
    }

    #[test]
    fn test_expired_token_rejected_and_effect_withheld() {
        let db = Database::open_in_memory().unwrap();
        let service = TokenService::new(&db);
        let user_id = make_user(&db);

        // Insert a token whose validity window has already closed
        let mut token = AuthToken::new(user_id, TokenPurpose::PasswordReset);
        token.expires_at = Utc::now() - chrono::Duration::minutes(1);
        db.tokens(TokenPurpose::PasswordReset)
            .create(&token)
            .unwrap();

        assert!(matches!(
            service.reset_password(&token.token, "new-hash"),
            Err(Error::TokenInvalid)
        ));

        let user = db.users().find_by_id(user_id).unwrap().unwrap();
        assert_eq!(user.password_hash, "hash");
    }

    #[test]
    fn test_expiry_boundary_counts_as_expired() {
        let db = Database::open_in_memory().unwrap();
        let service = TokenService::new(&db);
        let user_id = make_user(&db);

        // Valid window is a strict `now < expires_at`, so a token expiring
        // "now" is already dead by the time it is checked.
        let mut token = AuthToken::new(user_id, TokenPurpose::EmailVerification);
        token.expires_at = Utc::now();
        db.tokens(TokenPurpose::EmailVerification)
            .create(&token)
            .unwrap();

        assert!(matches!(
            service.verify_email(&token.token),
            Err(Error::TokenInvalid)
        ));
    }
}
