//! Newsletter subscription model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's newsletter subscription (one per user, toggled on/off)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
}

impl NewsletterSubscription {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            is_active: true,
            subscribed_at: Utc::now(),
        }
    }
}
