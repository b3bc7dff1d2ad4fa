//! Event storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    parse_category, parse_datetime, parse_datetime_opt, parse_uuid, parse_uuid_opt, OptionalExt,
};
use crate::error::Result;
use crate::models::{Event, EventCategory};

pub struct EventStore<'a> {
    conn: &'a Connection,
}

const EVENT_COLUMNS: &str = "id, title, description, category, event_date, end_time, location, \
     max_capacity, club_id, organizer_name, organizer_email, is_published, created_at, updated_at";

fn row_to_event(row: &Row<'_>) -> std::result::Result<Event, rusqlite::Error> {
    Ok(Event {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: parse_category(&row.get::<_, String>(3)?)?,
        event_date: parse_datetime(&row.get::<_, String>(4)?)?,
        end_time: parse_datetime_opt(row.get::<_, Option<String>>(5)?)?,
        location: row.get(6)?,
        max_capacity: row.get(7)?,
        club_id: parse_uuid_opt(row.get::<_, Option<String>>(8)?)?,
        organizer_name: row.get(9)?,
        organizer_email: row.get(10)?,
        is_published: row.get::<_, i32>(11)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(12)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(13)?)?,
    })
}

impl<'a> EventStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new event
    #[instrument(skip(self, event), fields(title = %event.title))]
    pub fn create(&self, event: &Event) -> Result<()> {
        self.conn.execute(
            "INSERT INTO events (id, title, description, category, event_date, end_time, location,
                                 max_capacity, club_id, organizer_name, organizer_email,
                                 is_published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                event.id.to_string(),
                event.title,
                event.description,
                event.category.as_str(),
                event.event_date.to_rfc3339(),
                event.end_time.map(|t| t.to_rfc3339()),
                event.location,
                event.max_capacity,
                event.club_id.map(|id| id.to_string()),
                event.organizer_name,
                event.organizer_email,
                event.is_published as i32,
                event.created_at.to_rfc3339(),
                event.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find event by ID
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"))?;

        let event = stmt
            .query_row(params![id.to_string()], row_to_event)
            .optional()?;

        Ok(event)
    }

    /// Update an event's editable fields
    pub fn update(&self, event: &Event) -> Result<()> {
        self.conn.execute(
            "UPDATE events SET title = ?1, description = ?2, category = ?3, event_date = ?4,
                               end_time = ?5, location = ?6, max_capacity = ?7, club_id = ?8,
                               organizer_name = ?9, organizer_email = ?10, updated_at = ?11
             WHERE id = ?12",
            params![
                event.title,
                event.description,
                event.category.as_str(),
                event.event_date.to_rfc3339(),
                event.end_time.map(|t| t.to_rfc3339()),
                event.location,
                event.max_capacity,
                event.club_id.map(|id| id.to_string()),
                event.organizer_name,
                event.organizer_email,
                Utc::now().to_rfc3339(),
                event.id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Publish or unpublish an event
    pub fn set_published(&self, event_id: Uuid, published: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE events SET is_published = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                published as i32,
                Utc::now().to_rfc3339(),
                event_id.to_string()
            ],
        )?;
        Ok(())
    }

    /// Delete an event (registrations cascade with it)
    pub fn delete(&self, event_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM events WHERE id = ?1",
            params![event_id.to_string()],
        )?;
        Ok(())
    }

    /// List published events, newest first, optionally filtered by category
    pub fn list_published(
        &self,
        category: Option<EventCategory>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Event>> {
        let events = match category {
            Some(cat) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events
                     WHERE is_published = 1 AND category = ?1
                     ORDER BY event_date DESC LIMIT ?2 OFFSET ?3"
                ))?;
                let rows = stmt
                    .query_map(params![cat.as_str(), limit, offset], row_to_event)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events
                     WHERE is_published = 1
                     ORDER BY event_date DESC LIMIT ?1 OFFSET ?2"
                ))?;
                let rows = stmt
                    .query_map(params![limit, offset], row_to_event)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(events)
    }

    /// Total event count
    pub fn count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }
}
