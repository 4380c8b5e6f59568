//! Edit-distance matching with field-aware preprocessing and boosting.
//!
//! Structured fields (emails, phone numbers) drift in formatting rather than
//! in content: punctuation, spacing and casing change while the digits and
//! symbols stay put. Normalizing the format away before comparing, plus a
//! confidence floor when the domain signal agrees, makes those fields match
//! reliably even when the surrounding formatting does not.

use lazy_static::lazy_static;
use regex::Regex;
use strsim::normalized_levenshtein;

use crate::matching::fields::FieldKind;
use crate::matching::FieldMatch;
use crate::processing::locator::TextLocations;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s").unwrap();
    static ref PHONE_PUNCT: Regex = Regex::new(r"[\s\-\(\)\+]").unwrap();
}

/// Find the candidate closest to `target` by normalized edit distance,
/// after field-specific preprocessing. An exact key in the candidate map
/// short-circuits at score 1.0.
pub fn find_sequence_match(
    target: &str,
    candidates: &TextLocations,
    kind: FieldKind,
) -> Option<FieldMatch> {
    let target = target.to_lowercase().trim().to_string();
    if let Some(bbox) = candidates.get(&target) {
        return Some(FieldMatch {
            text: target,
            bbox,
            score: 1.0,
        });
    }

    let clean_target = preprocess(&target, kind);
    let mut best: Option<FieldMatch> = None;
    for (candidate, bbox) in candidates.iter() {
        let clean_candidate = preprocess(candidate, kind);
        let ratio = normalized_levenshtein(&clean_target, &clean_candidate) as f32;
        let ratio = boost(&clean_target, &clean_candidate, ratio, kind);
        if best.as_ref().map_or(ratio > 0.0, |b| ratio > b.score) {
            best = Some(FieldMatch {
                text: candidate.to_string(),
                bbox,
                score: ratio,
            });
        }
    }
    best
}

/// Strip the formatting that legitimately varies for a field kind.
fn preprocess(text: &str, kind: FieldKind) -> String {
    match kind {
        FieldKind::Email => WHITESPACE.replace_all(text, "").into_owned(),
        FieldKind::Phone => PHONE_PUNCT.replace_all(text, "").into_owned(),
        _ => text.to_string(),
    }
}

fn digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Raise the score when a field-specific signal agrees even though the raw
/// ratio is weak: shared `@` for emails, matching digit sequences for phone
/// numbers.
fn boost(target: &str, candidate: &str, base: f32, kind: FieldKind) -> f32 {
    match kind {
        FieldKind::Email if target.contains('@') && candidate.contains('@') => base.max(0.8),
        FieldKind::Phone => {
            let target_digits = digits(target);
            let candidate_digits = digits(candidate);
            if !target_digits.is_empty() && !candidate_digits.is_empty() {
                let digit_ratio =
                    normalized_levenshtein(&target_digits, &candidate_digits) as f32;
                if digit_ratio > 0.7 {
                    return base.max(0.75 + digit_ratio * 0.2);
                }
            }
            base
        }
        _ => base,
    }
}
