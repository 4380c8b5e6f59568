pub mod error;
pub mod text;

pub use error::AnnotateError;
pub use text::{clean_text, NOT_FOUND};
