use std::borrow::Cow;

use validator::ValidationError;

pub mod auth;
pub mod categories;
pub mod products;
pub mod sales;
pub mod users;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Phone numbers are stored as 11 digit strings.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.len() == 11 && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(invalid("phone_number", "Invalid phone number."))
    }
}

pub fn validate_post_code(value: &str) -> Result<(), ValidationError> {
    if (5..=10).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(invalid("post_code", "Invalid post code."))
    }
}

pub fn validate_verification_code(value: &str) -> Result<(), ValidationError> {
    if value.len() == 6 && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(invalid("verification_code", "Invalid verification code."))
    }
}
