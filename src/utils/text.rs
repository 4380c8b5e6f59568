use lazy_static::lazy_static;
use regex::Regex;

/// Sentinel the extraction stage emits for fields it could not find.
pub const NOT_FOUND: &str = "Not Found";

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapse whitespace runs and trim; empty or sentinel text stays sentinel.
pub fn clean_text(text: &str) -> String {
    if text.trim().is_empty() || text == NOT_FOUND {
        return NOT_FOUND.to_string();
    }
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_trims_and_collapses() {
        assert_eq!(clean_text("Test"), "Test");
        assert_eq!(clean_text("  Test  "), "Test");
        assert_eq!(clean_text("Test   with    multiple    spaces"), "Test with multiple spaces");
        assert_eq!(clean_text("Test\nwith\nnewlines"), "Test with newlines");
        assert_eq!(clean_text("Test\t with\ttabs"), "Test with tabs");
    }

    #[test]
    fn test_clean_text_sentinel() {
        assert_eq!(clean_text(""), NOT_FOUND);
        assert_eq!(clean_text("   "), NOT_FOUND);
        assert_eq!(clean_text(NOT_FOUND), NOT_FOUND);
    }
}
