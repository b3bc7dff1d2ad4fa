//! Newsletter subscription storage operations

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::NewsletterSubscription;

pub struct NewsletterStore<'a> {
    conn: &'a Connection,
}

impl<'a> NewsletterStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Subscribe a user: creates a row, or reactivates an existing one
    pub fn subscribe(&self, user_id: Uuid) -> Result<NewsletterSubscription> {
        if let Some(mut existing) = self.find_for_user(user_id)? {
            self.conn.execute(
                "UPDATE newsletter_subscriptions SET is_active = 1 WHERE user_id = ?1",
                params![user_id.to_string()],
            )?;
            existing.is_active = true;
            return Ok(existing);
        }

        let subscription = NewsletterSubscription::new(user_id);
        self.conn.execute(
            "INSERT INTO newsletter_subscriptions (id, user_id, is_active, subscribed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                subscription.id.to_string(),
                subscription.user_id.to_string(),
                subscription.is_active as i32,
                subscription.subscribed_at.to_rfc3339(),
            ],
        )?;
        Ok(subscription)
    }

    /// Deactivate a user's subscription if one exists
    pub fn unsubscribe(&self, user_id: Uuid) -> Result<()> {
        self.conn.execute(
            "UPDATE newsletter_subscriptions SET is_active = 0 WHERE user_id = ?1",
            params![user_id.to_string()],
        )?;
        Ok(())
    }

    /// Find a user's subscription row
    pub fn find_for_user(&self, user_id: Uuid) -> Result<Option<NewsletterSubscription>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, is_active, subscribed_at
             FROM newsletter_subscriptions WHERE user_id = ?1",
        )?;

        let subscription = stmt
            .query_row(params![user_id.to_string()], |row| {
                Ok(NewsletterSubscription {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    user_id: parse_uuid(&row.get::<_, String>(1)?)?,
                    is_active: row.get::<_, i32>(2)? != 0,
                    subscribed_at: parse_datetime(&row.get::<_, String>(3)?)?,
                })
            })
            .optional()?;

        Ok(subscription)
    }

    /// Active subscriber count
    pub fn count_active(&self) -> Result<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM newsletter_subscriptions WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
