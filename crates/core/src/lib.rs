//! Tessera Core Library
//!
//! Core models, domain services, and storage for the Tessera membership
//! and events platform.

pub mod accounts;
pub mod admission;
pub mod config;
pub mod content;
pub mod error;
pub mod invariants;
pub mod models;
pub mod notify;
pub mod storage;
pub mod tokens;
pub mod validate;

pub use accounts::AccountService;
pub use admission::AdmissionController;
pub use config::AppConfig;
pub use content::{ClubDraft, ContentService, DashboardStats, EventDraft};
pub use error::{Error, Result};
pub use models::*;
pub use notify::{LogNotifier, Notifier};
pub use storage::{
    AuthTokenStore, ClubRepository, ClubStore, Database, EventRepository, EventStore,
    NewsletterRepository, NewsletterStore, RegistrationRepository, RegistrationStore, Storage,
    TokenRepository, UserRepository, UserStore,
};
pub use tokens::TokenService;
