//! Format validators for extracted contact fields.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    static ref PHONE_SEPARATORS: Regex = Regex::new(r"[\s\-\.\(\)]").unwrap();
    static ref PHONE: Regex = Regex::new(r"^\+?\d+$").unwrap();
    static ref URL: Regex = Regex::new(
        r"^(https?://)?(www\.)?([a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)+)(/[a-zA-Z0-9_-]+)*/?$"
    )
    .unwrap();
}

pub fn validate_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// A phone number is valid when, separators aside, it is 7 to 15 characters
/// of digits with an optional leading `+`.
pub fn validate_phone(phone: &str) -> bool {
    let cleaned = PHONE_SEPARATORS.replace_all(phone, "");
    (7..=15).contains(&cleaned.chars().count()) && PHONE.is_match(&cleaned)
}

pub fn validate_url(url: &str) -> bool {
    URL.is_match(url)
}

pub fn validate_linkedin_url(url: &str) -> bool {
    validate_url(url) && url.contains("linkedin.com")
}
