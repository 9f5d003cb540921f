//! Input validation for credentials and account fields

use crate::utils::error::{GateError, Result};
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

/// Lowercase and trim an email so uniqueness checks are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email shape
pub fn validate_email(email: &str) -> Result<()> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(GateError::validation(
            "email: please enter a valid email address",
        ))
    }
}

/// Validate password strength: at least 8 characters with a digit, an
/// uppercase letter, a lowercase letter, and a special character.
pub fn validate_password(field: &str, password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(GateError::Validation(format!(
            "{field}: must be at least 8 characters long"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(GateError::Validation(format!(
            "{field}: must contain at least one number"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(GateError::Validation(format!(
            "{field}: must contain at least one uppercase letter"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(GateError::Validation(format!(
            "{field}: must contain at least one lowercase letter"
        )));
    }
    if !password.chars().any(|c| "@$!%*?&#".contains(c)) {
        return Err(GateError::Validation(format!(
            "{field}: must contain at least one special character"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_email() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("  First.Last@example.co.uk ").is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("two@@x.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn accepts_strong_password() {
        assert!(validate_password("password", "Abc12345!").is_ok());
    }

    #[test]
    fn rejects_weak_passwords() {
        // Too short
        assert!(validate_password("password", "Ab1!").is_err());
        // No digit
        assert!(validate_password("password", "Abcdefgh!").is_err());
        // No uppercase
        assert!(validate_password("password", "abc12345!").is_err());
        // No lowercase
        assert!(validate_password("password", "ABC12345!").is_err());
        // No special character
        assert!(validate_password("password", "Abc123456").is_err());
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = validate_password("confirm_password", "short").unwrap_err();
        assert!(err.to_string().contains("confirm_password"));
    }
}
