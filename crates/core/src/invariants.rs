//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{AuthToken, Event, EventRegistration};

/// Validate that an event's state is internally consistent
pub fn assert_event_invariants(event: &Event) {
    // Title must not be empty
    debug_assert!(
        !event.title.trim().is_empty(),
        "Event {} has empty title",
        event.id
    );

    // A declared capacity of zero admits nobody and is almost certainly a bug
    debug_assert!(
        event.max_capacity != Some(0),
        "Event {} has zero capacity",
        event.id
    );

    // End time, when present, must not precede the start
    if let Some(end) = event.end_time {
        debug_assert!(
            end >= event.event_date,
            "Event {} ends before it starts",
            event.id
        );
    }
}

/// Validate that a registration is well-formed
pub fn assert_registration_invariants(registration: &EventRegistration) {
    debug_assert!(
        registration.event_id != Uuid::nil(),
        "Registration {} has nil event_id",
        registration.id
    );

    debug_assert!(
        registration.user_id != Uuid::nil(),
        "Registration {} has nil user_id",
        registration.id
    );

    debug_assert!(
        registration.hours_contributed >= 0.0,
        "Registration {} has negative hours",
        registration.id
    );
}

/// Validate that a token's timestamps are coherent
pub fn assert_token_invariants(token: &AuthToken) {
    debug_assert!(
        token.expires_at > token.created_at,
        "Token {} expires before it was created",
        token.id
    );

    debug_assert!(!token.token.is_empty(), "Token {} has empty string", token.id);
}
