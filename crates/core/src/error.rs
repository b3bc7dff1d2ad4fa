//! Error types for Tessera Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Event not found")]
    EventNotFound,

    #[error("Club not found")]
    ClubNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Registration not found")]
    RegistrationNotFound,

    #[error("Already registered for this event")]
    AlreadyRegistered,

    #[error("Event is at full capacity")]
    CapacityExceeded,

    #[error("Token not found")]
    TokenNotFound,

    #[error("Token is invalid or expired")]
    TokenInvalid,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
