//! Storage repository traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, mock, future network backend).

use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AuthToken, Club, Event, EventCategory, EventRegistration, NewsletterSubscription, Session,
    TokenPurpose, User,
};

/// User repository operations
pub trait UserRepository {
    /// Create a new user
    fn create_user(&self, user: &User) -> Result<()>;

    /// Find user by ID
    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Find user by username
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Find user by email address
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Mark a user's email address as verified
    fn set_email_verified(&self, user_id: Uuid) -> Result<()>;

    /// Replace a user's password hash
    fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<()>;

    /// Update user's last login time
    fn update_last_login(&self, user_id: Uuid) -> Result<()>;

    /// Create a session
    fn create_session(&self, session: &Session) -> Result<()>;

    /// Find a valid (non-expired) session
    fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>>;

    /// Delete a session
    fn delete_session(&self, session_id: Uuid) -> Result<()>;

    /// Delete all sessions for a user
    fn delete_user_sessions(&self, user_id: Uuid) -> Result<()>;

    /// Clean up expired sessions
    fn cleanup_expired_sessions(&self) -> Result<u64>;
}

/// Club repository operations
pub trait ClubRepository {
    /// Create a new club
    fn create_club(&self, club: &Club) -> Result<()>;

    /// Find club by ID
    fn find_club_by_id(&self, id: Uuid) -> Result<Option<Club>>;

    /// Update a club
    fn update_club(&self, club: &Club) -> Result<()>;

    /// Deactivate a club
    fn deactivate_club(&self, club_id: Uuid) -> Result<()>;

    /// List active clubs
    fn list_active_clubs(&self) -> Result<Vec<Club>>;
}

/// Event repository operations
pub trait EventRepository {
    /// Create a new event
    fn create_event(&self, event: &Event) -> Result<()>;

    /// Find event by ID
    fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>>;

    /// Update an event
    fn update_event(&self, event: &Event) -> Result<()>;

    /// Publish or unpublish an event
    fn set_event_published(&self, event_id: Uuid, published: bool) -> Result<()>;

    /// Delete an event and its registrations
    fn delete_event(&self, event_id: Uuid) -> Result<()>;

    /// List published events with optional category filter
    fn list_published_events(
        &self,
        category: Option<EventCategory>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Event>>;
}

/// Registration repository operations
pub trait RegistrationRepository {
    /// Create a new registration
    fn create_registration(&self, registration: &EventRegistration) -> Result<()>;

    /// Find a user's registration for an event (any status)
    fn find_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventRegistration>>;

    /// Count confirmed registrations for an event
    fn count_confirmed_registrations(&self, event_id: Uuid) -> Result<u64>;

    /// Delete a user's registration; returns whether a row existed
    fn delete_registration(&self, event_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// List registrations for an event
    fn list_registrations_for_event(&self, event_id: Uuid) -> Result<Vec<EventRegistration>>;

    /// List a user's registrations
    fn list_registrations_for_user(&self, user_id: Uuid) -> Result<Vec<EventRegistration>>;

    /// Record attendance and credit hours
    fn record_attendance(&self, registration_id: Uuid, hours: f64) -> Result<()>;

    /// Total volunteering hours for a user
    fn total_hours_for_user(&self, user_id: Uuid) -> Result<f64>;
}

/// Auth token repository operations
pub trait TokenRepository {
    /// Persist a token
    fn create_token(&self, purpose: TokenPurpose, token: &AuthToken) -> Result<()>;

    /// Find a token by its opaque string
    fn find_token(&self, purpose: TokenPurpose, token: &str) -> Result<Option<AuthToken>>;

    /// Invalidate all unused tokens for a user
    fn invalidate_unused_tokens(&self, purpose: TokenPurpose, user_id: Uuid) -> Result<u64>;

    /// Mark a token used
    fn mark_token_used(&self, purpose: TokenPurpose, token_id: Uuid) -> Result<()>;
}

/// Newsletter repository operations
pub trait NewsletterRepository {
    /// Subscribe a user (or reactivate)
    fn subscribe(&self, user_id: Uuid) -> Result<NewsletterSubscription>;

    /// Unsubscribe a user
    fn unsubscribe(&self, user_id: Uuid) -> Result<()>;

    /// Find a user's subscription
    fn find_subscription(&self, user_id: Uuid) -> Result<Option<NewsletterSubscription>>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite or mocks.
pub trait Storage:
    UserRepository
    + ClubRepository
    + EventRepository
    + RegistrationRepository
    + TokenRepository
    + NewsletterRepository
{
}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where
    T: UserRepository
        + ClubRepository
        + EventRepository
        + RegistrationRepository
        + TokenRepository
        + NewsletterRepository
{
}
