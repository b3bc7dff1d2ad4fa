//! Club storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::Club;

pub struct ClubStore<'a> {
    conn: &'a Connection,
}

const CLUB_COLUMNS: &str = "id, name, description, meeting_day, meeting_time, meeting_location, \
     leader_name, leader_email, website_url, is_active, created_at, updated_at";

fn row_to_club(row: &Row<'_>) -> std::result::Result<Club, rusqlite::Error> {
    Ok(Club {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        name: row.get(1)?,
        description: row.get(2)?,
        meeting_day: row.get(3)?,
        meeting_time: row.get(4)?,
        meeting_location: row.get(5)?,
        leader_name: row.get(6)?,
        leader_email: row.get(7)?,
        website_url: row.get(8)?,
        is_active: row.get::<_, i32>(9)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(10)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(11)?)?,
    })
}

impl<'a> ClubStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new club
    pub fn create(&self, club: &Club) -> Result<()> {
        self.conn.execute(
            "INSERT INTO clubs (id, name, description, meeting_day, meeting_time, meeting_location,
                                leader_name, leader_email, website_url, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                club.id.to_string(),
                club.name,
                club.description,
                club.meeting_day,
                club.meeting_time,
                club.meeting_location,
                club.leader_name,
                club.leader_email,
                club.website_url,
                club.is_active as i32,
                club.created_at.to_rfc3339(),
                club.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find club by ID
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Club>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CLUB_COLUMNS} FROM clubs WHERE id = ?1"))?;

        let club = stmt
            .query_row(params![id.to_string()], row_to_club)
            .optional()?;

        Ok(club)
    }

    /// Update a club's editable fields
    pub fn update(&self, club: &Club) -> Result<()> {
        self.conn.execute(
            "UPDATE clubs SET name = ?1, description = ?2, meeting_day = ?3, meeting_time = ?4,
                              meeting_location = ?5, leader_name = ?6, leader_email = ?7,
                              website_url = ?8, updated_at = ?9
             WHERE id = ?10",
            params![
                club.name,
                club.description,
                club.meeting_day,
                club.meeting_time,
                club.meeting_location,
                club.leader_name,
                club.leader_email,
                club.website_url,
                Utc::now().to_rfc3339(),
                club.id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Hide a club from listings without deleting its events
    pub fn deactivate(&self, club_id: Uuid) -> Result<()> {
        self.conn.execute(
            "UPDATE clubs SET is_active = 0, updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), club_id.to_string()],
        )?;
        Ok(())
    }

    /// List active clubs, alphabetical
    pub fn list_active(&self) -> Result<Vec<Club>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CLUB_COLUMNS} FROM clubs WHERE is_active = 1 ORDER BY name"
        ))?;

        let clubs = stmt
            .query_map([], row_to_club)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(clubs)
    }

    /// Active club count
    pub fn count_active(&self) -> Result<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM clubs WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
