//! Contact enquiry validation.
//!
//! Delivery of enquiries is not wired up; the request layer reports that after the
//! enquiry itself has been validated.

use serde::{Deserialize, Serialize};

/// A field of the contact form that failed validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Phone,
    Message,
}

/// Missing fields deserialize as empty and are reported by [`ContactEnquiry::invalid_fields`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ContactEnquiry {
    pub name: String,
    pub phone: String,
    pub subject: Option<String>,
    pub message: String,
}

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

impl ContactEnquiry {
    /// All failing fields, in form order. Empty means valid.
    pub fn invalid_fields(&self) -> Vec<ContactField> {
        let mut invalid = Vec::new();
        if self.name.trim().is_empty() {
            invalid.push(ContactField::Name);
        }
        if !is_valid_phone(&self.phone) {
            invalid.push(ContactField::Phone);
        }
        if self.message.trim().is_empty() {
            invalid.push(ContactField::Message);
        }
        invalid
    }
}

fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}
