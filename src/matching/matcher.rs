use std::collections::HashMap;

use log::debug;

use crate::matching::fields::FieldKind;
use crate::matching::{ngram, sequence};
use crate::models::NormalizedBox;
use crate::processing::locator::TextLocations;

/// Minimum similarity a fuzzy match needs to make it into the output.
pub const MIN_MATCH_SCORE: f32 = 0.7;

/// Matches flattened field values against located page text.
pub struct FieldMatcher;

impl FieldMatcher {
    /// Resolve each flat field to a normalized box. Fields that cannot be
    /// matched confidently are absent from the result; a weak match is not
    /// an error.
    pub fn match_fields(
        locations: &TextLocations,
        fields: &[(String, String)],
    ) -> HashMap<String, NormalizedBox> {
        let mut coordinates = HashMap::new();

        for (name, value) in fields {
            // The flattener only emits eligible fields; re-check here so the
            // matcher is safe against arbitrary maps too.
            let Some(kind) = FieldKind::from_field_name(name) else {
                continue;
            };
            let needle = value.to_lowercase().trim().to_string();
            if needle.is_empty() {
                continue;
            }

            // A verbatim hit needs no fuzzy step.
            if let Some(bbox) = locations.get(&needle) {
                coordinates.insert(name.clone(), bbox);
                continue;
            }

            let found = match kind {
                FieldKind::Name => ngram::find_ngram_match(&needle, locations),
                _ => sequence::find_sequence_match(&needle, locations, kind),
            };
            match found {
                Some(m) if m.score >= MIN_MATCH_SCORE => {
                    debug!("{name}: matched {:?} (score {:.2})", m.text, m.score);
                    coordinates.insert(name.clone(), m.bbox);
                }
                Some(m) => {
                    debug!("{name}: best candidate {:?} too weak (score {:.2})", m.text, m.score);
                }
                None => debug!("{name}: no candidate"),
            }
        }

        coordinates
    }
}
