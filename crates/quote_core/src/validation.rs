//! Contact form and photo checks applied before a quote is submitted.

use std::sync::LazyLock;

use regex::Regex;
use shared::{
    error::QuoteError,
    protocol::{ContactField, ContactForm, PhotoFile},
};

pub const MAX_PHOTOS: usize = 7;
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;
pub const ACCEPTED_PHOTO_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern compiles")
});

pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(&email.trim().to_lowercase())
}

/// North American numbers only: exactly ten digits once punctuation is dropped.
pub fn validate_phone(phone: &str) -> bool {
    phone.chars().filter(char::is_ascii_digit).count() == 10
}

/// Formats digits progressively as `(xxx) xxx-xxxx` while the number is typed.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

pub fn validate_contact(form: &ContactForm) -> Result<(), QuoteError> {
    if form.name.trim().is_empty() {
        return Err(invalid(ContactField::Name, "is required"));
    }
    if !validate_email(&form.email) {
        return Err(invalid(
            ContactField::Email,
            "please enter a valid email address",
        ));
    }
    if !validate_phone(&form.phone) {
        return Err(invalid(
            ContactField::Phone,
            "please enter a valid 10-digit phone number",
        ));
    }
    if form.city.trim().is_empty() {
        return Err(invalid(ContactField::City, "is required"));
    }
    Ok(())
}

fn invalid(field: ContactField, message: &str) -> QuoteError {
    QuoteError::InvalidContact {
        field,
        message: message.to_string(),
    }
}

pub fn validate_photos(photos: &[PhotoFile]) -> Result<(), QuoteError> {
    if photos.len() > MAX_PHOTOS {
        return Err(QuoteError::InvalidPhotos(format!(
            "Maximum {MAX_PHOTOS} photos allowed."
        )));
    }

    for photo in photos {
        let accepted = photo
            .mime_type
            .as_deref()
            .is_some_and(|mime| ACCEPTED_PHOTO_TYPES.contains(&mime.to_ascii_lowercase().as_str()));
        if !accepted {
            return Err(QuoteError::InvalidPhotos(format!(
                "Invalid file type: {}. Only JPG, PNG, and WebP allowed.",
                photo.filename
            )));
        }
        if photo.bytes.len() > MAX_PHOTO_BYTES {
            return Err(QuoteError::InvalidPhotos(format!(
                "File too large: {}. Max 10MB per photo.",
                photo.filename
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
