//! Form input validation
//!
//! Validators normalize as they check (trim, lowercase email) and return the
//! cleaned value, so callers store exactly what was validated.

use crate::error::{Error, Result};

/// Validate a username: 3-80 chars, alphanumeric plus `_` and `-`
pub fn validate_username(username: &str) -> Result<String> {
    let username = username.trim();

    if username.len() < 3 {
        return Err(Error::Validation(
            "Username must be at least 3 characters".into(),
        ));
    }

    if username.len() > 80 {
        return Err(Error::Validation("Username is too long".into()));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::Validation(
            "Username can only contain letters, numbers, underscores, and hyphens".into(),
        ));
    }

    Ok(username.to_string())
}

/// Validate an email address; returns it lowercased
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(Error::Validation("Email is required".into()));
    }

    if email.len() > 120 {
        return Err(Error::Validation("Email is too long".into()));
    }

    // local@domain.tld with at least a two-letter TLD
    let Some((local, domain)) = email.split_once('@') else {
        return Err(Error::Validation("Invalid email format".into()));
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));

    let domain_ok = match domain.rsplit_once('.') {
        Some((name, tld)) => {
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
                && tld.len() >= 2
                && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    };

    if !local_ok || !domain_ok {
        return Err(Error::Validation("Invalid email format".into()));
    }

    Ok(email)
}

/// Validate password strength: 6-128 chars
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::Validation("Password is required".into()));
    }

    if password.len() < 6 {
        return Err(Error::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    if password.len() > 128 {
        return Err(Error::Validation("Password is too long".into()));
    }

    Ok(())
}

/// Validate a title/heading field: 2 chars minimum, bounded length
pub fn validate_title(title: &str, max_length: usize) -> Result<String> {
    let title = title.trim();

    if title.len() < 2 {
        return Err(Error::Validation("Title is too short".into()));
    }

    if title.len() > max_length {
        return Err(Error::Validation(format!(
            "Title must be less than {max_length} characters"
        )));
    }

    Ok(title.to_string())
}

/// Validate an optional description/text field
pub fn validate_description(description: &str, max_length: usize) -> Result<Option<String>> {
    let description = description.trim();

    if description.is_empty() {
        return Ok(None);
    }

    if description.len() > max_length {
        return Err(Error::Validation(format!(
            "Description must be less than {max_length} characters"
        )));
    }

    Ok(Some(description.to_string()))
}

/// Validate an optional http(s) URL
pub fn validate_url(url: &str) -> Result<Option<String>> {
    let url = url.trim();

    if url.is_empty() {
        return Ok(None);
    }

    if url.len() > 500 {
        return Err(Error::Validation("URL is too long".into()));
    }

    let lowered = url.to_lowercase();
    if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
        return Err(Error::Validation("Invalid URL format".into()));
    }

    if url.chars().any(|c| c.is_whitespace()) {
        return Err(Error::Validation("Invalid URL format".into()));
    }

    Ok(Some(url.to_string()))
}

/// Validate a volunteering-hours value: finite and non-negative
pub fn validate_hours(hours: f64) -> Result<f64> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(Error::Validation("Hours must be a non-negative number".into()));
    }

    Ok(hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert_eq!(validate_username("  alice  ").unwrap(), "alice");
        assert_eq!(validate_username("a_b-1").unwrap(), "a_b-1");
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(81)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(
            validate_email(" Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a@b.c").is_err()); // one-letter TLD
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_title_and_description() {
        assert_eq!(validate_title(" Beach Cleanup ", 200).unwrap(), "Beach Cleanup");
        assert!(validate_title("x", 200).is_err());
        assert!(validate_title(&"x".repeat(201), 200).is_err());

        assert_eq!(validate_description("", 5000).unwrap(), None);
        assert_eq!(
            validate_description("hello", 5000).unwrap().as_deref(),
            Some("hello")
        );
        assert!(validate_description(&"x".repeat(5001), 5000).is_err());
    }

    #[test]
    fn test_url_rules() {
        assert_eq!(validate_url("").unwrap(), None);
        assert_eq!(
            validate_url("https://example.com/club").unwrap().as_deref(),
            Some("https://example.com/club")
        );
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("https://bad url.com").is_err());
    }

    #[test]
    fn test_hours_rules() {
        assert_eq!(validate_hours(2.5).unwrap(), 2.5);
        assert_eq!(validate_hours(0.0).unwrap(), 0.0);
        assert!(validate_hours(-1.0).is_err());
        assert!(validate_hours(f64::NAN).is_err());
    }
}
