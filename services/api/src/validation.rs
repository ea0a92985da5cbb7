//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Request payloads that check their own invariants after deserialization
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email.trim()) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Reject empty or whitespace-only text
pub fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

/// Reject negative or non-finite measurements
pub fn validate_measurement(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} must be a non-negative number", field));
    }
    Ok(())
}

/// Canonical form used for email lookups and uniqueness
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@example.com").is_ok());
        assert!(validate_email("  jane@example.com ").is_ok());
        assert_eq!(validate_email(""), Err("Email is required".to_string()));
        assert_eq!(
            validate_email("jane.example.com"),
            Err("Invalid email format".to_string())
        );
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_require_text_and_measurement() {
        assert!(require_text("Title", "Annual checkup").is_ok());
        assert_eq!(require_text("Title", "   "), Err("Title is required".to_string()));
        assert!(validate_measurement("Value", 0.0).is_ok());
        assert!(validate_measurement("Value", -1.0).is_err());
        assert!(validate_measurement("Value", f64::NAN).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Jane@Example.COM "), "jane@example.com");
    }
}
