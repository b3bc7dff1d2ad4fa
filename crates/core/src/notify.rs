//! Outbound notification interface
//!
//! The core never sends mail itself; it hands the user and the raw token (or
//! event) to a `Notifier`. Delivery failures are reported back but callers
//! treat them as best-effort: a failed confirmation mail never unwinds the
//! registration or token issuance that triggered it.

use tracing::info;

use crate::error::Result;
use crate::models::{Event, User};

/// Delivery interface for user-facing notifications
pub trait Notifier {
    /// Event registration confirmation
    fn registration_confirmed(&self, user: &User, event: &Event) -> Result<()>;

    /// Email verification link carrying the raw token
    fn verification_link(&self, user: &User, token: &str) -> Result<()>;

    /// Password reset link carrying the raw token
    fn password_reset_link(&self, user: &User, token: &str) -> Result<()>;
}

/// Log-only notifier: writes the link or confirmation to the log instead of
/// delivering it. Used in development and by the CLI.
pub struct LogNotifier {
    base_url: String,
}

impl LogNotifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Notifier for LogNotifier {
    fn registration_confirmed(&self, user: &User, event: &Event) -> Result<()> {
        info!(
            email = %user.email,
            event = %event.title,
            "Registration confirmed"
        );
        Ok(())
    }

    fn verification_link(&self, user: &User, token: &str) -> Result<()> {
        info!(
            email = %user.email,
            url = %format!("{}/auth/verify/{token}", self.base_url),
            "Email verification link"
        );
        Ok(())
    }

    fn password_reset_link(&self, user: &User, token: &str) -> Result<()> {
        info!(
            email = %user.email,
            url = %format!("{}/auth/reset/{token}", self.base_url),
            "Password reset link"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records notifications for assertions; can be told to fail
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: RefCell<Vec<String>>,
        pub fail: bool,
    }

    impl RecordingNotifier {
        pub fn failing() -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                fail: true,
            }
        }

        fn record(&self, entry: String) -> Result<()> {
            if self.fail {
                return Err(crate::error::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "delivery failed",
                )));
            }
            self.sent.borrow_mut().push(entry);
            Ok(())
        }
    }

    impl Notifier for RecordingNotifier {
        fn registration_confirmed(&self, user: &User, event: &Event) -> Result<()> {
            self.record(format!("registration:{}:{}", user.email, event.title))
        }

        fn verification_link(&self, user: &User, token: &str) -> Result<()> {
            self.record(format!("verify:{}:{token}", user.email))
        }

        fn password_reset_link(&self, user: &User, token: &str) -> Result<()> {
            self.record(format!("reset:{}:{token}", user.email))
        }
    }
}
