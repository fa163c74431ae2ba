use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::LineItem;

const NO_PHOTOS: &str = "No photos uploaded";
const GENERAL_INQUIRY: &str = "General Inquiry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    City,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContactField::Name => "Full name",
            ContactField::Email => "Email",
            ContactField::Phone => "Phone",
            ContactField::City => "City",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Immutable hand-off of the quote at submission time. `items` covers every
/// TV priced in `quote_text` and `grand_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteSnapshot {
    pub items: Vec<LineItem>,
    pub quote_text: String,
    pub grand_total: u32,
}

impl QuoteSnapshot {
    pub fn has_quote(&self) -> bool {
        !self.items.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub contact: ContactForm,
    pub snapshot: QuoteSnapshot,
    pub photos: Vec<PhotoFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub submitted_at: DateTime<Utc>,
    pub photo_urls: Vec<String>,
    pub photos_dropped: usize,
}

/// JSON body accepted by the spreadsheet intake endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakePayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub message: String,
    pub total_estimate: String,
    pub service_type: String,
    pub photo_urls: String,
}

impl IntakePayload {
    pub fn new(contact: &ContactForm, snapshot: &QuoteSnapshot, photo_urls: &[String]) -> Self {
        let message = contact
            .message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or("-")
            .to_string();
        let (total_estimate, service_type) = if snapshot.has_quote() {
            (
                format!("${}", snapshot.grand_total),
                snapshot.quote_text.clone(),
            )
        } else {
            ("-".to_string(), GENERAL_INQUIRY.to_string())
        };
        let photo_urls = if photo_urls.is_empty() {
            NO_PHOTOS.to_string()
        } else {
            photo_urls.join("\n")
        };

        Self {
            name: contact.name.trim().to_string(),
            email: contact.email.trim().to_string(),
            phone: contact.phone.trim().to_string(),
            city: contact.city.trim().to_string(),
            message,
            total_estimate,
            service_type,
            photo_urls,
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
