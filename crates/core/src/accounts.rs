//! Account flows: registration, login, verification, password management
//!
//! Ties validation, argon2 hashing, the token lifecycle, and notification
//! together. Lookups that might reveal whether an address is registered
//! return a generic outcome; the detail goes to the log instead.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Session, TokenPurpose, User};
use crate::notify::Notifier;
use crate::storage::Database;
use crate::tokens::TokenService;
use crate::validate;

/// Default session lifetime for logins (one week)
const SESSION_HOURS: i64 = 24 * 7;

pub struct AccountService<'a> {
    db: &'a Database,
    notifier: &'a dyn Notifier,
    session_hours: i64,
}

impl<'a> AccountService<'a> {
    pub fn new(db: &'a Database, notifier: &'a dyn Notifier) -> Self {
        Self {
            db,
            notifier,
            session_hours: SESSION_HOURS,
        }
    }

    /// Override the session lifetime (configured via `session_hours`)
    pub fn with_session_hours(mut self, hours: i64) -> Self {
        self.session_hours = hours;
        self
    }

    /// Register a new account and issue its email verification token.
    /// Returns the created user and the raw token.
    #[instrument(skip(self, password))]
    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<(User, String)> {
        let username = validate::validate_username(username)?;
        let email = validate::validate_email(email)?;
        validate::validate_password(password)?;

        let users = self.db.users();
        if users.find_by_username(&username)?.is_some() {
            return Err(Error::Validation("Username already taken".into()));
        }
        if users.find_by_email(&email)?.is_some() {
            return Err(Error::Validation("Email already registered".into()));
        }

        let user = User::new(username, email, hash_password(password)?);
        users.create(&user)?;

        let token = TokenService::new(self.db).issue(user.id, TokenPurpose::EmailVerification)?;
        if let Err(e) = self.notifier.verification_link(&user, &token) {
            warn!(user_id = %user.id, error = %e, "Verification notification failed");
        }

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok((user, token))
    }

    /// Log a user in, creating a session.
    ///
    /// Unknown username and wrong password produce the same error, so the
    /// response does not reveal which accounts exist.
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<(User, Session)> {
        let users = self.db.users();

        let user = users
            .find_by_username(username)?
            .ok_or_else(|| Error::Authentication("Invalid username or password".into()))?;

        if !verify_password(&user.password_hash, password) {
            info!(username, "Login rejected: bad credentials");
            return Err(Error::Authentication("Invalid username or password".into()));
        }

        users.update_last_login(user.id)?;

        let session = Session::new(user.id, self.session_hours);
        users.create_session(&session)?;

        info!(user_id = %user.id, "User logged in");
        Ok((user, session))
    }

    /// Log out by deleting the session
    pub fn logout(&self, session_id: Uuid) -> Result<()> {
        self.db.users().delete_session(session_id)
    }

    /// Redeem an email verification token
    pub fn verify_email(&self, token: &str) -> Result<User> {
        TokenService::new(self.db).verify_email(token)
    }

    /// Start a password reset for the given address.
    ///
    /// Always returns `Ok`: `Some(token)` when the address is registered and
    /// the reset mail went out, `None` otherwise. The caller shows the same
    /// "if this address is registered, you will receive a link" message
    /// either way; only the log records the difference.
    #[instrument(skip(self))]
    pub fn request_password_reset(&self, email: &str) -> Result<Option<String>> {
        let email = validate::validate_email(email)?;

        let Some(user) = self.db.users().find_by_email(&email)? else {
            info!(%email, "Password reset requested for unknown address");
            return Ok(None);
        };

        let token = TokenService::new(self.db).issue(user.id, TokenPurpose::PasswordReset)?;
        if let Err(e) = self.notifier.password_reset_link(&user, &token) {
            warn!(user_id = %user.id, error = %e, "Reset notification failed");
        }

        info!(user_id = %user.id, "Password reset token issued");
        Ok(Some(token))
    }

    /// Complete a password reset with a token. All existing sessions for the
    /// user are dropped once the new password is in place.
    #[instrument(skip(self, token, new_password))]
    pub fn reset_password(&self, token: &str, new_password: &str) -> Result<User> {
        validate::validate_password(new_password)?;

        let hash = hash_password(new_password)?;
        let user = TokenService::new(self.db).reset_password(token, &hash)?;

        self.db.users().delete_user_sessions(user.id)?;

        info!(user_id = %user.id, "Password reset completed");
        Ok(user)
    }

    /// Change password for a logged-in user, verifying the current one
    #[instrument(skip(self, current_password, new_password))]
    pub fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let users = self.db.users();
        let user = users.find_by_id(user_id)?.ok_or(Error::UserNotFound)?;

        if !verify_password(&user.password_hash, current_password) {
            return Err(Error::Authentication(
                "Current password is incorrect".into(),
            ));
        }

        validate::validate_password(new_password)?;
        users.update_password_hash(user_id, &hash_password(new_password)?)?;

        info!(%user_id, "Password changed");
        Ok(())
    }

    /// Change a user's email address. The new address starts unverified and
    /// gets a fresh verification token (stale ones are invalidated by the
    /// issue step). Returns the raw token.
    #[instrument(skip(self))]
    pub fn change_email(&self, user_id: Uuid, new_email: &str) -> Result<String> {
        let new_email = validate::validate_email(new_email)?;

        let users = self.db.users();
        let user = users.find_by_id(user_id)?.ok_or(Error::UserNotFound)?;

        if let Some(existing) = users.find_by_email(&new_email)? {
            if existing.id != user_id {
                return Err(Error::Validation("Email already in use".into()));
            }
        }

        users.update_email(user_id, &new_email)?;

        let token = TokenService::new(self.db).issue(user_id, TokenPurpose::EmailVerification)?;
        let updated = users.find_by_id(user_id)?.ok_or(Error::UserNotFound)?;
        if let Err(e) = self.notifier.verification_link(&updated, &token) {
            warn!(%user_id, error = %e, "Verification notification failed");
        }

        info!(%user_id, "Email changed, verification pending");
        Ok(token)
    }

    /// Re-send the verification link for a not-yet-verified address
    pub fn resend_verification(&self, user_id: Uuid) -> Result<String> {
        let user = self
            .db
            .users()
            .find_by_id(user_id)?
            .ok_or(Error::UserNotFound)?;

        if user.email_verified {
            return Err(Error::Validation("Email is already verified".into()));
        }

        let token = TokenService::new(self.db).issue(user_id, TokenPurpose::EmailVerification)?;
        if let Err(e) = self.notifier.verification_link(&user, &token) {
            warn!(%user_id, error = %e, "Verification notification failed");
        }

        Ok(token)
    }

    /// Create an administrator account with a pre-verified address.
    /// Used by operational tooling, not by the public registration flow.
    #[instrument(skip(self, password))]
    pub fn create_admin(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let username = validate::validate_username(username)?;
        let email = validate::validate_email(email)?;
        validate::validate_password(password)?;

        let users = self.db.users();
        if users.find_by_username(&username)?.is_some() {
            return Err(Error::Validation("Username already taken".into()));
        }
        if users.find_by_email(&email)?.is_some() {
            return Err(Error::Validation("Email already registered".into()));
        }

        let mut user = User::new(username, email, hash_password(password)?).as_admin();
        user.email_verified = true;
        users.create(&user)?;

        info!(user_id = %user.id, username = %user.username, "Admin account created");
        Ok(user)
    }
}

/// Hash a password with argon2 and a fresh salt
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Authentication(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored PHC hash string
fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;

    #[test]
    fn test_register_and_login() {
        let db = Database::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let accounts = AccountService::new(&db, &notifier);

        let (user, _token) = accounts
            .register("alice", "Alice@Example.com", "secret1")
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(!user.email_verified);

        let (logged_in, session) = accounts.login("alice", "secret1").unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(db.users().find_valid_session(session.id).unwrap().is_some());
        assert!(logged_in.last_login.is_none()); // set after this row was read

        // A verification link went out at registration
        assert!(notifier.sent.borrow()[0].starts_with("verify:alice@example.com:"));
    }

    #[test]
    fn test_login_error_does_not_reveal_account_existence() {
        let db = Database::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let accounts = AccountService::new(&db, &notifier);

        accounts
            .register("alice", "alice@example.com", "secret1")
            .unwrap();

        let wrong_password = accounts.login("alice", "wrong").unwrap_err();
        let unknown_user = accounts.login("nobody", "wrong").unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let db = Database::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let accounts = AccountService::new(&db, &notifier);

        accounts
            .register("alice", "alice@example.com", "secret1")
            .unwrap();

        assert!(matches!(
            accounts.register("alice", "other@example.com", "secret1"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            accounts.register("bob", "alice@example.com", "secret1"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_email_verification_flow() {
        let db = Database::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let accounts = AccountService::new(&db, &notifier);

        let (user, token) = accounts
            .register("alice", "alice@example.com", "secret1")
            .unwrap();

        let verified = accounts.verify_email(&token).unwrap();
        assert!(verified.email_verified);

        // Resending for a verified address is refused
        assert!(matches!(
            accounts.resend_verification(user.id),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_password_reset_flow() {
        let db = Database::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let accounts = AccountService::new(&db, &notifier);

        accounts
            .register("alice", "alice@example.com", "oldpass")
            .unwrap();
        let (_, session) = accounts.login("alice", "oldpass").unwrap();

        let token = accounts
            .request_password_reset("alice@example.com")
            .unwrap()
            .expect("registered address gets a token");

        accounts.reset_password(&token, "newpass").unwrap();

        // Old password dead, new one works, old session dropped
        assert!(accounts.login("alice", "oldpass").is_err());
        accounts.login("alice", "newpass").unwrap();
        assert!(db.users().find_valid_session(session.id).unwrap().is_none());

        // The token was single-use
        assert!(matches!(
            accounts.reset_password(&token, "another"),
            Err(Error::TokenInvalid)
        ));
    }

    #[test]
    fn test_reset_for_unknown_address_is_generic() {
        let db = Database::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let accounts = AccountService::new(&db, &notifier);

        // No error, no token, nothing sent
        let outcome = accounts.request_password_reset("ghost@example.com").unwrap();
        assert!(outcome.is_none());
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn test_change_password_requires_current() {
        let db = Database::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let accounts = AccountService::new(&db, &notifier);

        let (user, _) = accounts
            .register("alice", "alice@example.com", "secret1")
            .unwrap();

        assert!(matches!(
            accounts.change_password(user.id, "wrong", "newpass"),
            Err(Error::Authentication(_))
        ));

        accounts
            .change_password(user.id, "secret1", "newpass")
            .unwrap();
        accounts.login("alice", "newpass").unwrap();
    }

    #[test]
    fn test_change_email_restarts_verification() {
        let db = Database::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let accounts = AccountService::new(&db, &notifier);

        let (user, first_token) = accounts
            .register("alice", "alice@example.com", "secret1")
            .unwrap();
        accounts.verify_email(&first_token).unwrap();

        let token = accounts.change_email(user.id, "new@example.com").unwrap();

        let updated = db.users().find_by_id(user.id).unwrap().unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert!(!updated.email_verified);

        accounts.verify_email(&token).unwrap();
        assert!(db.users().find_by_id(user.id).unwrap().unwrap().email_verified);
    }

    #[test]
    fn test_create_admin() {
        let db = Database::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let accounts = AccountService::new(&db, &notifier);

        let admin = accounts
            .create_admin("root", "root@example.com", "secret1")
            .unwrap();
        assert!(admin.is_admin);
        assert!(admin.email_verified);

        accounts.login("root", "secret1").unwrap();
    }
}
