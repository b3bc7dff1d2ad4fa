//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event category (CAS classification)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    Creativity,
    Activity,
    Service,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Creativity => "Creativity",
            EventCategory::Activity => "Activity",
            EventCategory::Service => "Service",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Creativity" => Some(EventCategory::Creativity),
            "Activity" => Some(EventCategory::Activity),
            "Service" => Some(EventCategory::Service),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An event users can register for
///
/// `max_capacity` of `None` means unlimited admission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: EventCategory,
    pub event_date: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub max_capacity: Option<u32>,
    pub club_id: Option<Uuid>,
    pub organizer_name: Option<String>,
    pub organizer_email: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(title: String, category: EventCategory, event_date: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description: None,
            category,
            event_date,
            end_time: None,
            location: None,
            max_capacity: None,
            club_id: None,
            organizer_name: None,
            organizer_email: None,
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_capacity(mut self, max: u32) -> Self {
        self.max_capacity = Some(max);
        self
    }

    pub fn with_club(mut self, club_id: Uuid) -> Self {
        self.club_id = Some(club_id);
        self
    }

    pub fn with_location(mut self, location: String) -> Self {
        self.location = Some(location);
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }
}
