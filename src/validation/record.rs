//! Sanitizing of extraction records before localization.
//!
//! The extraction stage occasionally hallucinates malformed contact fields;
//! demoting them to the sentinel keeps garbage out of the matching stage.

use crate::models::{ResumeData, ResumeDocument};
use crate::utils::{clean_text, NOT_FOUND};
use crate::validation::contact::{validate_email, validate_phone};

/// Sanitize every page record of a document in place.
pub fn sanitize_document(document: &mut ResumeDocument) {
    match document {
        ResumeDocument::Single(data) => sanitize_record(data),
        ResumeDocument::Paged { pages } => {
            for data in pages.values_mut() {
                sanitize_record(data);
            }
        }
    }
}

/// Sanitize one page record in place: normalize whitespace in the free-text
/// personal fields, demote invalid emails and phone numbers to the
/// sentinel, and clean the date fields.
pub fn sanitize_record(data: &mut ResumeData) {
    let info = &mut data.personal_info;
    if let Some(name) = &info.name {
        if name != NOT_FOUND {
            info.name = Some(clean_text(name));
        }
    }
    if let Some(location) = &info.location {
        if location != NOT_FOUND {
            info.location = Some(clean_text(location));
        }
    }
    if let Some(email) = &info.email {
        if email != NOT_FOUND && !validate_email(email) {
            info.email = Some(NOT_FOUND.to_string());
        }
    }
    if let Some(phone) = &info.phone {
        if phone != NOT_FOUND && !validate_phone(phone) {
            info.phone = Some(NOT_FOUND.to_string());
        }
    }

    for entry in &mut data.education {
        if let Some(date) = &entry.grad_date {
            entry.grad_date = Some(clean_date(date));
        }
    }
    for entry in &mut data.work_experience {
        if let Some(date) = &entry.duration {
            entry.duration = Some(clean_date(date));
        }
    }
}

/// Clean a date string; empty values become the sentinel. Range formats
/// like "2018-2020" are preserved as extracted.
pub fn clean_date(date: &str) -> String {
    if date.trim().is_empty() || date == NOT_FOUND {
        NOT_FOUND.to_string()
    } else {
        date.to_string()
    }
}
