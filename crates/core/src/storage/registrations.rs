//! Event registration storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_status, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{EventRegistration, RegistrationStatus};

pub struct RegistrationStore<'a> {
    conn: &'a Connection,
}

const REGISTRATION_COLUMNS: &str = "id, event_id, user_id, full_name, email, phone, status, \
     hours_contributed, notes, registered_at";

fn row_to_registration(row: &Row<'_>) -> std::result::Result<EventRegistration, rusqlite::Error> {
    Ok(EventRegistration {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        event_id: parse_uuid(&row.get::<_, String>(1)?)?,
        user_id: parse_uuid(&row.get::<_, String>(2)?)?,
        full_name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        status: parse_status(&row.get::<_, String>(6)?)?,
        hours_contributed: row.get(7)?,
        notes: row.get(8)?,
        registered_at: parse_datetime(&row.get::<_, String>(9)?)?,
    })
}

impl<'a> RegistrationStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new registration
    #[instrument(skip(self, registration), fields(event_id = %registration.event_id, user_id = %registration.user_id))]
    pub fn create(&self, registration: &EventRegistration) -> Result<()> {
        self.conn.execute(
            "INSERT INTO event_registrations (id, event_id, user_id, full_name, email, phone,
                                              status, hours_contributed, notes, registered_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                registration.id.to_string(),
                registration.event_id.to_string(),
                registration.user_id.to_string(),
                registration.full_name,
                registration.email,
                registration.phone,
                registration.status.as_str(),
                registration.hours_contributed,
                registration.notes,
                registration.registered_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find a user's registration for an event, regardless of status
    pub fn find_by_event_and_user(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventRegistration>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations
             WHERE event_id = ?1 AND user_id = ?2"
        ))?;

        let registration = stmt
            .query_row(
                params![event_id.to_string(), user_id.to_string()],
                row_to_registration,
            )
            .optional()?;

        Ok(registration)
    }

    /// Count confirmed registrations for an event with a single statement,
    /// read from the store at call time
    pub fn count_confirmed(&self, event_id: Uuid) -> Result<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = ?1 AND status = 'confirmed'",
            params![event_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Remove a user's registration outright; returns whether a row existed
    pub fn delete_by_event_and_user(&self, event_id: Uuid, user_id: Uuid) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM event_registrations WHERE event_id = ?1 AND user_id = ?2",
            params![event_id.to_string(), user_id.to_string()],
        )?;
        Ok(removed > 0)
    }

    /// List registrations for an event, oldest first
    pub fn list_for_event(&self, event_id: Uuid) -> Result<Vec<EventRegistration>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations
             WHERE event_id = ?1 ORDER BY registered_at"
        ))?;

        let registrations = stmt
            .query_map(params![event_id.to_string()], row_to_registration)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(registrations)
    }

    /// List a user's registrations, newest first
    pub fn list_for_user(&self, user_id: Uuid) -> Result<Vec<EventRegistration>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations
             WHERE user_id = ?1 ORDER BY registered_at DESC"
        ))?;

        let registrations = stmt
            .query_map(params![user_id.to_string()], row_to_registration)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(registrations)
    }

    /// Record attendance: status becomes `attended` and hours are credited
    pub fn record_attendance(&self, registration_id: Uuid, hours: f64) -> Result<()> {
        self.conn.execute(
            "UPDATE event_registrations SET status = ?1, hours_contributed = ?2 WHERE id = ?3",
            params![
                RegistrationStatus::Attended.as_str(),
                hours,
                registration_id.to_string()
            ],
        )?;
        Ok(())
    }

    /// Total volunteering hours credited to a user across attended events
    pub fn total_hours_for_user(&self, user_id: Uuid) -> Result<f64> {
        let total: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(hours_contributed), 0) FROM event_registrations
             WHERE user_id = ?1 AND status = 'attended'",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Total registration count
    pub fn count(&self) -> Result<u64> {
        let count: u64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM event_registrations", [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }
}
