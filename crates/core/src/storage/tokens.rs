//! Auth token storage operations
//!
//! One store shape over two tables; the purpose picks the table. Rows are
//! never deleted, only flipped to used, so consumed tokens stay auditable.

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{AuthToken, TokenPurpose};

pub struct AuthTokenStore<'a> {
    conn: &'a Connection,
    purpose: TokenPurpose,
}

fn row_to_token(row: &Row<'_>) -> std::result::Result<AuthToken, rusqlite::Error> {
    Ok(AuthToken {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
        token: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?)?,
        expires_at: parse_datetime(&row.get::<_, String>(4)?)?,
        used: row.get::<_, i32>(5)? != 0,
    })
}

impl<'a> AuthTokenStore<'a> {
    pub fn new(conn: &'a Connection, purpose: TokenPurpose) -> Self {
        Self { conn, purpose }
    }

    /// Persist a freshly issued token
    pub fn create(&self, token: &AuthToken) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, user_id, token, created_at, expires_at, used)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                self.purpose.table()
            ),
            params![
                token.id.to_string(),
                token.user_id.to_string(),
                token.token,
                token.created_at.to_rfc3339(),
                token.expires_at.to_rfc3339(),
                token.used as i32,
            ],
        )?;
        Ok(())
    }

    /// Find a token by its exact opaque string
    pub fn find_by_token(&self, token: &str) -> Result<Option<AuthToken>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, user_id, token, created_at, expires_at, used
             FROM {} WHERE token = ?1",
            self.purpose.table()
        ))?;

        let token = stmt.query_row(params![token], row_to_token).optional()?;

        Ok(token)
    }

    /// Mark every unused token for a user as used; returns how many were
    /// invalidated
    pub fn invalidate_unused_for_user(&self, user_id: Uuid) -> Result<u64> {
        let count = self.conn.execute(
            &format!(
                "UPDATE {} SET used = 1 WHERE user_id = ?1 AND used = 0",
                self.purpose.table()
            ),
            params![user_id.to_string()],
        )?;
        Ok(count as u64)
    }

    /// Flip a single token to used
    pub fn mark_used(&self, token_id: Uuid) -> Result<()> {
        self.conn.execute(
            &format!(
                "UPDATE {} SET used = 1 WHERE id = ?1",
                self.purpose.table()
            ),
            params![token_id.to_string()],
        )?;
        Ok(())
    }

    /// List a user's tokens, newest first (audit view)
    pub fn list_for_user(&self, user_id: Uuid) -> Result<Vec<AuthToken>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, user_id, token, created_at, expires_at, used
             FROM {} WHERE user_id = ?1 ORDER BY created_at DESC",
            self.purpose.table()
        ))?;

        let tokens = stmt
            .query_map(params![user_id.to_string()], row_to_token)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::storage::Database;

    fn setup_user(db: &Database) -> Uuid {
        let user = User::new("alice".into(), "alice@example.com".into(), "hash".into());
        db.users().create(&user).unwrap();
        user.id
    }

    #[test]
    fn test_create_and_find_token() {
        let db = Database::open_in_memory().unwrap();
        let user_id = setup_user(&db);
        let store = db.tokens(TokenPurpose::EmailVerification);

        let token = AuthToken::new(user_id, TokenPurpose::EmailVerification);
        store.create(&token).unwrap();

        let found = store.find_by_token(&token.token).unwrap().unwrap();
        assert_eq!(found.id, token.id);
        assert!(!found.used);

        assert!(store.find_by_token("no-such-token").unwrap().is_none());
    }

    #[test]
    fn test_purposes_do_not_share_a_namespace() {
        let db = Database::open_in_memory().unwrap();
        let user_id = setup_user(&db);

        let token = AuthToken::new(user_id, TokenPurpose::EmailVerification);
        db.tokens(TokenPurpose::EmailVerification)
            .create(&token)
            .unwrap();

        assert!(db
            .tokens(TokenPurpose::PasswordReset)
            .find_by_token(&token.token)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalidate_unused_leaves_used_rows_alone() {
        let db = Database::open_in_memory().unwrap();
        let user_id = setup_user(&db);
        let store = db.tokens(TokenPurpose::PasswordReset);

        let consumed = AuthToken::new(user_id, TokenPurpose::PasswordReset);
        store.create(&consumed).unwrap();
        store.mark_used(consumed.id).unwrap();

        let outstanding = AuthToken::new(user_id, TokenPurpose::PasswordReset);
        store.create(&outstanding).unwrap();

        // Only the one outstanding token is affected
        assert_eq!(store.invalidate_unused_for_user(user_id).unwrap(), 1);
        assert!(store.find_by_token(&outstanding.token).unwrap().unwrap().used);
    }

    #[test]
    fn test_duplicate_token_string_rejected() {
        let db = Database::open_in_memory().unwrap();
        let user_id = setup_user(&db);
        let store = db.tokens(TokenPurpose::EmailVerification);

        let first = AuthToken::new(user_id, TokenPurpose::EmailVerification);
        store.create(&first).unwrap();

        let mut clone = AuthToken::new(user_id, TokenPurpose::EmailVerification);
        clone.token = first.token.clone();
        assert!(store.create(&clone).is_err());
    }
}
