//! Form validation for the sign-in and sign-up screens

use std::sync::LazyLock;

use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_NAME_LEN: usize = 2;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern is valid")
});

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub fn validate_password_match(password: &str, confirm: &str) -> bool {
    password == confirm
}

pub fn validate_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_NAME_LEN
}

/// First problem with a sign-in form, if any
pub fn validate_sign_in(email: &str, password: &str) -> Result<(), String> {
    check_email(email)?;
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    Ok(())
}

/// First problem with a sign-up form, if any
pub fn validate_sign_up(name: &str, email: &str, password: &str, confirm: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    if !validate_name(name) {
        return Err(format!("Name must be at least {} characters long", MIN_NAME_LEN));
    }
    check_email(email)?;
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if !validate_password(password) {
        return Err(format!("Password must be at least {} characters long", MIN_PASSWORD_LEN));
    }
    if !validate_password_match(password, confirm) {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }
    if !validate_email(email) {
        return Err("Invalid email address".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("First.Last+tag@Sub.Example.ORG"));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("user@example"));
        assert!(!validate_email("user@example.c"));
    }

    #[test]
    fn test_password() {
        assert!(!validate_password("short"));
        assert!(validate_password("longenough1"));
        assert!(validate_password("12345678"));
    }

    #[test]
    fn test_sign_up_messages() {
        assert_eq!(
            validate_sign_up("", "a@b.co", "longenough1", "longenough1").unwrap_err(),
            "Name is required"
        );
        assert_eq!(
            validate_sign_up("Al", "bad", "longenough1", "longenough1").unwrap_err(),
            "Invalid email address"
        );
        assert_eq!(
            validate_sign_up("Al", "a@b.co", "short", "short").unwrap_err(),
            "Password must be at least 8 characters long"
        );
        assert_eq!(
            validate_sign_up("Al", "a@b.co", "longenough1", "longenough2").unwrap_err(),
            "Passwords do not match"
        );
        assert!(validate_sign_up("Al", "a@b.co", "longenough1", "longenough1").is_ok());
    }

    #[test]
    fn test_sign_in_messages() {
        assert_eq!(validate_sign_in(" ", "x").unwrap_err(), "Email is required");
        assert_eq!(validate_sign_in("a@b.co", "").unwrap_err(), "Password is required");
        assert!(validate_sign_in("a@b.co", "whatever").is_ok());
    }
}
