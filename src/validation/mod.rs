pub mod contact;
pub mod record;

pub use contact::{validate_email, validate_linkedin_url, validate_phone, validate_url};
pub use record::{clean_date, sanitize_document, sanitize_record};
