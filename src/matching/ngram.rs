//! Character-n-gram cosine similarity for free-text fields.
//!
//! Names survive OCR badly: tokens merge, split and drift. Comparing
//! tf-idf-weighted character n-grams (2 to 4 characters, taken inside
//! word boundaries) tolerates that better than edit distance does.

use std::collections::HashMap;

use crate::matching::FieldMatch;
use crate::processing::locator::TextLocations;

const NGRAM_MIN: usize = 2;
const NGRAM_MAX: usize = 4;

/// Find the candidate most similar to `target` by n-gram cosine similarity.
///
/// Targets of up to 3 characters short-circuit: an exact candidate scores
/// 1.0, a candidate containing the target 0.9. A lone candidate is accepted
/// at a fixed 0.8 (forced choice). When vectorization degenerates (no
/// n-grams at all), a containment length-ratio fallback is used instead.
pub fn find_ngram_match(target: &str, candidates: &TextLocations) -> Option<FieldMatch> {
    let target = target.to_lowercase();

    if target.chars().count() <= 3 {
        if let Some(bbox) = candidates.get(&target) {
            return Some(FieldMatch {
                text: target,
                bbox,
                score: 1.0,
            });
        }
        if let Some((text, bbox)) = candidates.iter().find(|(text, _)| text.contains(&target)) {
            return Some(FieldMatch {
                text: text.to_string(),
                bbox,
                score: 0.9,
            });
        }
    }

    if candidates.is_empty() {
        return None;
    }
    if candidates.len() == 1 {
        let (text, bbox) = candidates.iter().next().unwrap();
        return Some(FieldMatch {
            text: text.to_string(),
            bbox,
            score: 0.8,
        });
    }

    let entries: Vec<(&str, _)> = candidates.iter().collect();
    let mut documents = Vec::with_capacity(entries.len() + 1);
    documents.push(target.as_str());
    documents.extend(entries.iter().map(|(text, _)| *text));

    match vectorize(&documents) {
        Some(vectors) => {
            let target_vector = &vectors[0];
            let mut best_index = 0;
            let mut best_score = f32::NEG_INFINITY;
            for (index, vector) in vectors[1..].iter().enumerate() {
                let score = cosine(target_vector, vector);
                if score > best_score {
                    best_index = index;
                    best_score = score;
                }
            }
            let (text, bbox) = entries[best_index];
            Some(FieldMatch {
                text: text.to_string(),
                bbox,
                score: best_score.max(0.0),
            })
        }
        None => containment_ratio_match(&target, candidates),
    }
}

/// Fallback when no n-grams could be extracted: score candidate pairs where
/// one string contains the other by their length ratio.
fn containment_ratio_match(target: &str, candidates: &TextLocations) -> Option<FieldMatch> {
    let target_len = target.chars().count();
    let mut best: Option<FieldMatch> = None;
    for (text, bbox) in candidates.iter() {
        if !target.contains(text) && !text.contains(target) {
            continue;
        }
        let text_len = text.chars().count();
        let ratio = target_len.min(text_len) as f32 / target_len.max(text_len).max(1) as f32;
        if best.as_ref().map_or(ratio > 0.0, |b| ratio > b.score) {
            best = Some(FieldMatch {
                text: text.to_string(),
                bbox,
                score: ratio,
            });
        }
    }
    best
}

/// Character n-grams of 2 to 4 characters over space-padded words, so grams
/// never cross word boundaries but do include the boundaries themselves.
fn char_ngrams(text: &str) -> Vec<String> {
    let mut grams = Vec::new();
    for word in text.split_whitespace() {
        let padded: Vec<char> = format!(" {word} ").chars().collect();
        for n in NGRAM_MIN..=NGRAM_MAX {
            if padded.len() < n {
                grams.push(padded.iter().collect());
                break;
            }
            for window in padded.windows(n) {
                grams.push(window.iter().collect());
            }
        }
    }
    grams
}

/// Tf-idf vectors (smoothed idf, l2-normalized) for a document set, fit
/// fresh on every call. Returns `None` when the combined vocabulary is
/// empty, the analog of a vectorizer refusing to fit.
fn vectorize(documents: &[&str]) -> Option<Vec<HashMap<String, f32>>> {
    let counts: Vec<HashMap<String, f32>> = documents
        .iter()
        .map(|document| {
            let mut tf = HashMap::new();
            for gram in char_ngrams(document) {
                *tf.entry(gram).or_insert(0.0) += 1.0;
            }
            tf
        })
        .collect();

    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for count in &counts {
        for gram in count.keys() {
            *document_frequency.entry(gram.as_str()).or_insert(0) += 1;
        }
    }
    if document_frequency.is_empty() {
        return None;
    }

    let n_documents = documents.len() as f32;
    let vectors = counts
        .iter()
        .map(|count| {
            let mut vector: HashMap<String, f32> = count
                .iter()
                .map(|(gram, tf)| {
                    let df = document_frequency[gram.as_str()] as f32;
                    let idf = ((1.0 + n_documents) / (1.0 + df)).ln() + 1.0;
                    (gram.clone(), tf * idf)
                })
                .collect();
            let norm = vector.values().map(|v| v * v).sum::<f32>().sqrt();
            if norm > 0.0 {
                for value in vector.values_mut() {
                    *value /= norm;
                }
            }
            vector
        })
        .collect();
    Some(vectors)
}

fn cosine(a: &HashMap<String, f32>, b: &HashMap<String, f32>) -> f32 {
    // Both vectors are l2-normalized, so the dot product is the cosine.
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(gram, value)| large.get(gram).map(|other| value * other))
        .sum()
}
