//! Administrative content management: clubs, events, attendance, dashboard

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::invariants::assert_event_invariants;
use crate::models::{Club, Event, EventCategory};
use crate::storage::Database;
use crate::validate;

const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 5000;

/// Input for creating or updating a club
#[derive(Debug, Clone, Default)]
pub struct ClubDraft {
    pub name: String,
    pub description: Option<String>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
    pub meeting_location: Option<String>,
    pub leader_name: Option<String>,
    pub leader_email: Option<String>,
    pub website_url: Option<String>,
}

/// Input for creating or updating an event
#[derive(Debug, Clone)]
pub struct EventDraft {
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
}

/// Counts shown on the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub users: u64,
    pub clubs: u64,
    pub events: u64,
    pub registrations: u64,
}

pub struct ContentService<'a> {
    db: &'a Database,
}

impl<'a> ContentService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub fn create_club(&self, draft: &ClubDraft) -> Result<Club> {
        let mut club = Club::new(String::new());
        self.apply_club_draft(&mut club, draft)?;

        self.db.clubs().create(&club)?;
        info!(club_id = %club.id, "Club created");
        Ok(club)
    }

    pub fn update_club(&self, club_id: Uuid, draft: &ClubDraft) -> Result<Club> {
        let mut club = self
            .db
            .clubs()
            .find_by_id(club_id)?
            .ok_or(Error::ClubNotFound)?;

        self.apply_club_draft(&mut club, draft)?;
        self.db.clubs().update(&club)?;
        Ok(club)
    }

    pub fn deactivate_club(&self, club_id: Uuid) -> Result<()> {
        if self.db.clubs().find_by_id(club_id)?.is_none() {
            return Err(Error::ClubNotFound);
        }
        self.db.clubs().deactivate(club_id)?;
        info!(%club_id, "Club deactivated");
        Ok(())
    }

    /// Create an event as a draft; it stays hidden until published
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub fn create_event(&self, draft: &EventDraft) -> Result<Event> {
        let blank = Event::new(String::new(), draft.category, draft.event_date);
        let event = self.event_from_draft(blank, draft)?;
        assert_event_invariants(&event);

        self.db.events().create(&event)?;
        info!(event_id = %event.id, "Event created");
        Ok(event)
    }

    pub fn update_event(&self, event_id: Uuid, draft: &EventDraft) -> Result<Event> {
        let existing = self
            .db
            .events()
            .find_by_id(event_id)?
            .ok_or(Error::EventNotFound)?;

        let event = self.event_from_draft(existing, draft)?;
        assert_event_invariants(&event);

        self.db.events().update(&event)?;
        Ok(event)
    }

    pub fn publish_event(&self, event_id: Uuid) -> Result<()> {
        if self.db.events().find_by_id(event_id)?.is_none() {
            return Err(Error::EventNotFound);
        }
        self.db.events().set_published(event_id, true)?;
        info!(%event_id, "Event published");
        Ok(())
    }

    pub fn unpublish_event(&self, event_id: Uuid) -> Result<()> {
        if self.db.events().find_by_id(event_id)?.is_none() {
            return Err(Error::EventNotFound);
        }
        self.db.events().set_published(event_id, false)?;
        Ok(())
    }

    /// Delete an event. Registrations go with it via the schema cascade.
    pub fn delete_event(&self, event_id: Uuid) -> Result<()> {
        if self.db.events().find_by_id(event_id)?.is_none() {
            return Err(Error::EventNotFound);
        }
        self.db.events().delete(event_id)?;
        info!(%event_id, "Event deleted");
        Ok(())
    }

    /// Record that a registrant attended, crediting service hours
    #[instrument(skip(self))]
    pub fn record_attendance(&self, event_id: Uuid, user_id: Uuid, hours: f64) -> Result<()> {
        let hours = validate::validate_hours(hours)?;

        let registration = self
            .db
            .registrations()
            .find_by_event_and_user(event_id, user_id)?
            .ok_or(Error::RegistrationNotFound)?;

        self.db
            .registrations()
            .record_attendance(registration.id, hours)?;
        info!(%event_id, %user_id, hours, "Attendance recorded");
        Ok(())
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        Ok(DashboardStats {
            users: self.db.users().count()?,
            clubs: self.db.clubs().count_active()?,
            events: self.db.events().count()?,
            registrations: self.db.registrations().count()?,
        })
    }

    fn apply_club_draft(&self, club: &mut Club, draft: &ClubDraft) -> Result<()> {
        club.name = validate::validate_title(&draft.name, TITLE_MAX)?;
        club.description =
            validate::validate_description(draft.description.as_deref().unwrap_or(""), DESCRIPTION_MAX)?;
        club.meeting_day = draft.meeting_day.clone();
        club.meeting_time = draft.meeting_time.clone();
        club.meeting_location = draft.meeting_location.clone();
        club.leader_name = draft.leader_name.clone();
        club.leader_email = match draft.leader_email.as_deref() {
            Some(email) if !email.trim().is_empty() => Some(validate::validate_email(email)?),
            _ => None,
        };
        club.website_url = validate::validate_url(draft.website_url.as_deref().unwrap_or(""))?;
        club.updated_at = Utc::now();
        Ok(())
    }

    fn event_from_draft(&self, mut event: Event, draft: &EventDraft) -> Result<Event> {
        event.title = validate::validate_title(&draft.title, TITLE_MAX)?;
        event.description =
            validate::validate_description(draft.description.as_deref().unwrap_or(""), DESCRIPTION_MAX)?;
        event.category = draft.category;
        event.event_date = draft.event_date;

        if let Some(end) = draft.end_time {
            if end < draft.event_date {
                return Err(Error::Validation(
                    "End time must not precede the event start".into(),
                ));
            }
        }
        event.end_time = draft.end_time;
        event.location = draft.location.clone();
        event.organizer_name = draft.organizer_name.clone();
        event.organizer_email = match draft.organizer_email.as_deref() {
            Some(email) if !email.trim().is_empty() => Some(validate::validate_email(email)?),
            _ => None,
        };
        event.updated_at = Utc::now();

        event.max_capacity = match draft.max_capacity {
            Some(0) => return Err(Error::Validation("Capacity must be positive".into())),
            other => other,
        };

        if let Some(club_id) = draft.club_id {
            if self.db.clubs().find_by_id(club_id)?.is_none() {
                return Err(Error::ClubNotFound);
            }
        }
        event.club_id = draft.club_id;

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            description: None,
            category: EventCategory::Service,
            event_date: Utc::now() + Duration::days(7),
            end_time: None,
            location: None,
            max_capacity: None,
            club_id: None,
            organizer_name: None,
            organizer_email: None,
        }
    }

    #[test]
    fn test_create_and_publish_event() {
        let db = Database::open_in_memory().unwrap();
        let content = ContentService::new(&db);

        let event = content.create_event(&draft("Beach Cleanup")).unwrap();
        assert!(!event.is_published);
        assert!(db.events().list_published(None, 10, 0).unwrap().is_empty());

        content.publish_event(event.id).unwrap();
        let listed = db.events().list_published(None, 10, 0).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Beach Cleanup");
    }

    #[test]
    fn test_event_validation() {
        let db = Database::open_in_memory().unwrap();
        let content = ContentService::new(&db);

        let mut bad = draft("   ");
        assert!(content.create_event(&bad).is_err());

        bad = draft("Capacity Zero");
        bad.max_capacity = Some(0);
        assert!(matches!(
            content.create_event(&bad),
            Err(Error::Validation(_))
        ));

        bad = draft("Ends Before Start");
        bad.end_time = Some(bad.event_date - Duration::hours(2));
        assert!(matches!(
            content.create_event(&bad),
            Err(Error::Validation(_))
        ));

        bad = draft("Ghost Club");
        bad.club_id = Some(Uuid::new_v4());
        assert!(matches!(
            content.create_event(&bad),
            Err(Error::ClubNotFound)
        ));
    }

    #[test]
    fn test_update_event_preserves_identity() {
        let db = Database::open_in_memory().unwrap();
        let content = ContentService::new(&db);

        let event = content.create_event(&draft("Original")).unwrap();
        content.publish_event(event.id).unwrap();

        let mut changed = draft("Renamed");
        changed.max_capacity = Some(50);
        let updated = content.update_event(event.id, &changed).unwrap();

        assert_eq!(updated.id, event.id);
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.max_capacity, Some(50));
        // Publish state is managed separately from the draft fields
        let stored = db.events().find_by_id(event.id).unwrap().unwrap();
        assert!(stored.is_published);
    }

    #[test]
    fn test_club_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let content = ContentService::new(&db);

        let club = content
            .create_club(&ClubDraft {
                name: "Chess Club".into(),
                description: Some("Weekly games".into()),
                meeting_day: Some("Friday".into()),
                meeting_time: Some("16:00".into()),
                leader_email: Some("Chess@Example.com".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(club.leader_email.as_deref(), Some("chess@example.com"));
        assert_eq!(db.clubs().count_active().unwrap(), 1);

        content.deactivate_club(club.id).unwrap();
        assert_eq!(db.clubs().count_active().unwrap(), 0);

        assert!(matches!(
            content.deactivate_club(Uuid::new_v4()),
            Err(Error::ClubNotFound)
        ));
    }

    #[test]
    fn test_club_url_validation() {
        let db = Database::open_in_memory().unwrap();
        let content = ContentService::new(&db);

        let bad = content.create_club(&ClubDraft {
            name: "Robotics".into(),
            website_url: Some("ftp://robots.example.com".into()),
            ..Default::default()
        });
        assert!(matches!(bad, Err(Error::Validation(_))));
    }

    #[test]
    fn test_record_attendance() {
        let db = Database::open_in_memory().unwrap();
        let content = ContentService::new(&db);

        let event = content.create_event(&draft("Park Restoration")).unwrap();
        let user = crate::models::User::new("alice".into(), "alice@example.com".into(), "h".into());
        db.users().create(&user).unwrap();

        assert!(matches!(
            content.record_attendance(event.id, user.id, 2.0),
            Err(Error::RegistrationNotFound)
        ));

        let registration = crate::models::EventRegistration::new(
            event.id,
            user.id,
            user.username.clone(),
            user.email.clone(),
        );
        db.registrations().create(&registration).unwrap();

        content.record_attendance(event.id, user.id, 2.5).unwrap();
        assert_eq!(
            db.registrations().total_hours_for_user(user.id).unwrap(),
            2.5
        );

        assert!(content.record_attendance(event.id, user.id, -1.0).is_err());
    }

    #[test]
    fn test_dashboard_stats() {
        let db = Database::open_in_memory().unwrap();
        let content = ContentService::new(&db);

        content
            .create_club(&ClubDraft {
                name: "Art Club".into(),
                ..Default::default()
            })
            .unwrap();
        content.create_event(&draft("Gallery Night")).unwrap();

        let stats = content.dashboard_stats().unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                users: 0,
                clubs: 1,
                events: 1,
                registrations: 0,
            }
        );
    }
}
