//! Event admission control
//!
//! Gates creation of confirmed registrations against an event's capacity.
//! The duplicate check, the confirmed count, and the insert all run inside
//! one transaction, so two concurrent registrants cannot both squeeze past
//! the capacity boundary.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::invariants::assert_registration_invariants;
use crate::models::EventRegistration;
use crate::notify::Notifier;
use crate::storage::{Database, EventStore, RegistrationStore, UserStore};

pub struct AdmissionController<'a> {
    db: &'a Database,
    notifier: &'a dyn Notifier,
}

impl<'a> AdmissionController<'a> {
    pub fn new(db: &'a Database, notifier: &'a dyn Notifier) -> Self {
        Self { db, notifier }
    }

    /// Admit a user to an event, creating a confirmed registration.
    ///
    /// Fails with `AlreadyRegistered` if the user holds any registration for
    /// the event (whatever its status), with `CapacityExceeded` if the event
    /// declares a capacity and its confirmed count has reached it. An event
    /// without a capacity always admits.
    ///
    /// The confirmation notification is attempted after commit and is
    /// best-effort: delivery failure never unwinds the registration.
    #[instrument(skip(self))]
    pub fn admit(&self, event_id: Uuid, user_id: Uuid) -> Result<EventRegistration> {
        let tx = self.db.transaction()?;

        let event = EventStore::new(&tx)
            .find_by_id(event_id)?
            .ok_or(Error::EventNotFound)?;
        let user = UserStore::new(&tx)
            .find_by_id(user_id)?
            .ok_or(Error::UserNotFound)?;

        let registrations = RegistrationStore::new(&tx);

        // Duplicate check comes first: a user already holding a row is
        // rejected without consulting capacity at all.
        if registrations
            .find_by_event_and_user(event_id, user_id)?
            .is_some()
        {
            return Err(Error::AlreadyRegistered);
        }

        if let Some(capacity) = event.max_capacity {
            let confirmed = registrations.count_confirmed(event_id)?;
            if confirmed >= capacity as u64 {
                info!(%event_id, confirmed, capacity, "Admission refused: event full");
                return Err(Error::CapacityExceeded);
            }
        }

        let registration =
            EventRegistration::new(event_id, user_id, user.username.clone(), user.email.clone());
        assert_registration_invariants(&registration);
        registrations.create(&registration)?;

        tx.commit()?;

        info!(%event_id, %user_id, "Registration confirmed");

        if let Err(e) = self.notifier.registration_confirmed(&user, &event) {
            warn!(%event_id, %user_id, error = %e, "Confirmation notification failed");
        }

        Ok(registration)
    }

    /// Remove a user's registration outright, freeing one capacity slot.
    ///
    /// The row is deleted rather than flipped to `cancelled`; see DESIGN.md
    /// for the audit-trail tradeoff.
    #[instrument(skip(self))]
    pub fn revoke(&self, event_id: Uuid, user_id: Uuid) -> Result<()> {
        let removed = self
            .db
            .registrations()
            .delete_by_event_and_user(event_id, user_id)?;

        if !removed {
            return Err(Error::RegistrationNotFound);
        }

        info!(%event_id, %user_id, "Registration revoked");
        Ok(())
    }
}
