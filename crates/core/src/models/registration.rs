//! Event registration model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    /// Holding a capacity slot
    Confirmed,
    /// Cancelled by an administrator (does not hold a slot)
    Cancelled,
    /// Attendance recorded after the event
    Attended,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Cancelled => "cancelled",
            RegistrationStatus::Attended => "attended",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(RegistrationStatus::Confirmed),
            "cancelled" => Some(RegistrationStatus::Cancelled),
            "attended" => Some(RegistrationStatus::Attended),
            _ => None,
        }
    }
}

/// A user's registration for an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRegistration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: RegistrationStatus,
    /// Volunteering hours credited once attendance is recorded
    pub hours_contributed: f64,
    pub notes: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl EventRegistration {
    pub fn new(event_id: Uuid, user_id: Uuid, full_name: String, email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            full_name,
            email,
            phone: None,
            status: RegistrationStatus::Confirmed,
            hours_contributed: 0.0,
            notes: None,
            registered_at: Utc::now(),
        }
    }

    pub fn with_phone(mut self, phone: String) -> Self {
        self.phone = Some(phone);
        self
    }
}
