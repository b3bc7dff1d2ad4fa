//! SQLite storage layer for Tessera

mod clubs;
mod events;
mod migrations;
mod newsletter;
mod parse;
mod registrations;
mod tokens;
mod traits;
mod users;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AuthToken, Club, Event, EventCategory, EventRegistration, NewsletterSubscription, Session,
    TokenPurpose, User,
};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use tracing::instrument;

pub use clubs::ClubStore;
pub use events::EventStore;
pub use newsletter::NewsletterStore;
pub use registrations::RegistrationStore;
pub use tokens::AuthTokenStore;
pub use traits::{
    ClubRepository, EventRepository, NewsletterRepository, RegistrationRepository, Storage,
    TokenRepository, UserRepository,
};
pub use users::UserStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Begin a transaction spanning multiple store operations.
    ///
    /// The services use this for the read-then-write pairs that must commit
    /// together: capacity check plus registration insert, token invalidation
    /// plus issuance, and token consumption plus its effect.
    pub(crate) fn transaction(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Get user store
    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(&self.conn)
    }

    /// Get club store
    pub fn clubs(&self) -> ClubStore<'_> {
        ClubStore::new(&self.conn)
    }

    /// Get event store
    pub fn events(&self) -> EventStore<'_> {
        EventStore::new(&self.conn)
    }

    /// Get registration store
    pub fn registrations(&self) -> RegistrationStore<'_> {
        RegistrationStore::new(&self.conn)
    }

    /// Get token store for a purpose
    pub fn tokens(&self, purpose: TokenPurpose) -> AuthTokenStore<'_> {
        AuthTokenStore::new(&self.conn, purpose)
    }

    /// Get newsletter store
    pub fn newsletter(&self) -> NewsletterStore<'_> {
        NewsletterStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl UserRepository for Database {
    fn create_user(&self, user: &User) -> Result<()> {
        self.users().create(user)
    }

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.users().find_by_id(id)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users().find_by_username(username)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users().find_by_email(email)
    }

    fn set_email_verified(&self, user_id: Uuid) -> Result<()> {
        self.users().set_email_verified(user_id)
    }

    fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        self.users().update_password_hash(user_id, password_hash)
    }

    fn update_last_login(&self, user_id: Uuid) -> Result<()> {
        self.users().update_last_login(user_id)
    }

    fn create_session(&self, session: &Session) -> Result<()> {
        self.users().create_session(session)
    }

    fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>> {
        self.users().find_valid_session(session_id)
    }

    fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.users().delete_session(session_id)
    }

    fn delete_user_sessions(&self, user_id: Uuid) -> Result<()> {
        self.users().delete_user_sessions(user_id)
    }

    fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.users().cleanup_expired_sessions()
    }
}

impl ClubRepository for Database {
    fn create_club(&self, club: &Club) -> Result<()> {
        self.clubs().create(club)
    }

    fn find_club_by_id(&self, id: Uuid) -> Result<Option<Club>> {
        self.clubs().find_by_id(id)
    }

    fn update_club(&self, club: &Club) -> Result<()> {
        self.clubs().update(club)
    }

    fn deactivate_club(&self, club_id: Uuid) -> Result<()> {
        self.clubs().deactivate(club_id)
    }

    fn list_active_clubs(&self) -> Result<Vec<Club>> {
        self.clubs().list_active()
    }
}

impl EventRepository for Database {
    fn create_event(&self, event: &Event) -> Result<()> {
        self.events().create(event)
    }

    fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        self.events().find_by_id(id)
    }

    fn update_event(&self, event: &Event) -> Result<()> {
        self.events().update(event)
    }

    fn set_event_published(&self, event_id: Uuid, published: bool) -> Result<()> {
        self.events().set_published(event_id, published)
    }

    fn delete_event(&self, event_id: Uuid) -> Result<()> {
        self.events().delete(event_id)
    }

    fn list_published_events(
        &self,
        category: Option<EventCategory>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Event>> {
        self.events().list_published(category, limit, offset)
    }
}

impl RegistrationRepository for Database {
    fn create_registration(&self, registration: &EventRegistration) -> Result<()> {
        self.registrations().create(registration)
    }

    fn find_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventRegistration>> {
        self.registrations().find_by_event_and_user(event_id, user_id)
    }

    fn count_confirmed_registrations(&self, event_id: Uuid) -> Result<u64> {
        self.registrations().count_confirmed(event_id)
    }

    fn delete_registration(&self, event_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.registrations()
            .delete_by_event_and_user(event_id, user_id)
    }

    fn list_registrations_for_event(&self, event_id: Uuid) -> Result<Vec<EventRegistration>> {
        self.registrations().list_for_event(event_id)
    }

    fn list_registrations_for_user(&self, user_id: Uuid) -> Result<Vec<EventRegistration>> {
        self.registrations().list_for_user(user_id)
    }

    fn record_attendance(&self, registration_id: Uuid, hours: f64) -> Result<()> {
        self.registrations().record_attendance(registration_id, hours)
    }

    fn total_hours_for_user(&self, user_id: Uuid) -> Result<f64> {
        self.registrations().total_hours_for_user(user_id)
    }
}

impl TokenRepository for Database {
    fn create_token(&self, purpose: TokenPurpose, token: &AuthToken) -> Result<()> {
        self.tokens(purpose).create(token)
    }

    fn find_token(&self, purpose: TokenPurpose, token: &str) -> Result<Option<AuthToken>> {
        self.tokens(purpose).find_by_token(token)
    }

    fn invalidate_unused_tokens(&self, purpose: TokenPurpose, user_id: Uuid) -> Result<u64> {
        self.tokens(purpose).invalidate_unused_for_user(user_id)
    }

    fn mark_token_used(&self, purpose: TokenPurpose, token_id: Uuid) -> Result<()> {
        self.tokens(purpose).mark_used(token_id)
    }
}

impl NewsletterRepository for Database {
    fn subscribe(&self, user_id: Uuid) -> Result<NewsletterSubscription> {
        self.newsletter().subscribe(user_id)
    }

    fn unsubscribe(&self, user_id: Uuid) -> Result<()> {
        self.newsletter().unsubscribe(user_id)
    }

    fn find_subscription(&self, user_id: Uuid) -> Result<Option<NewsletterSubscription>> {
        self.newsletter().find_for_user(user_id)
    }
}
