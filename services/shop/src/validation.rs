//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::services::user::UserError;

const PHONE_MIN_LEN: usize = 10;
const PHONE_MAX_LEN: usize = 13;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), UserError> {
    if email.is_empty() || email.len() > 254 {
        return Err(UserError::InvalidEmail);
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(UserError::InvalidEmail);
    }

    Ok(())
}

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), UserError> {
    if name.trim().is_empty() {
        return Err(UserError::InvalidName);
    }

    Ok(())
}

/// Validate phone number: 10 to 13 characters
pub fn validate_phone_number(phone_number: &str) -> Result<(), UserError> {
    let len = phone_number.chars().count();
    if !(PHONE_MIN_LEN..=PHONE_MAX_LEN).contains(&len) {
        return Err(UserError::InvalidPhoneNumber);
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), UserError> {
    if password.is_empty() || password.len() > 128 {
        return Err(UserError::InvalidPassword);
    }

    Ok(())
}

/// Parse a positive numeric identifier from a path or query segment
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}
