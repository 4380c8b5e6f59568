pub mod fields;
pub mod matcher;
pub mod ngram;
pub mod sequence;

pub use fields::{flatten_record, FieldKind};
pub use matcher::{FieldMatcher, MIN_MATCH_SCORE};

use crate::models::NormalizedBox;

/// A located candidate for one extracted field value.
#[derive(Debug, Clone)]
pub struct FieldMatch {
    /// The detected text the value was matched against.
    pub text: String,
    pub bbox: NormalizedBox,
    /// Similarity in `[0, 1]`, after any field-specific boosting.
    pub score: f32,
}
