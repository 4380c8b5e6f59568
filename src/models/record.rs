use std::collections::BTreeMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::NOT_FOUND;

/// Personal information section of an extraction record.
///
/// The extraction stage emits `"Not Found"` for fields it could not read;
/// absent keys deserialize to `None` and are treated the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersonalInfo {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Phone")]
    pub phone: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EducationEntry {
    #[serde(rename = "Degree")]
    pub degree: Option<String>,
    #[serde(rename = "Institution")]
    pub institution: Option<String>,
    #[serde(rename = "GradDate")]
    pub grad_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkExperienceEntry {
    #[serde(rename = "JobTitle")]
    pub job_title: Option<String>,
    #[serde(rename = "Company")]
    pub company: Option<String>,
    #[serde(rename = "Duration")]
    pub duration: Option<String>,
    #[serde(rename = "Responsibilities")]
    pub responsibilities: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Skills {
    #[serde(rename = "TechnicalSkills", deserialize_with = "string_or_list")]
    pub technical_skills: Vec<String>,
    #[serde(rename = "Languages", deserialize_with = "string_or_list")]
    pub languages: Vec<String>,
}

/// One page's worth of extracted resume fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResumeData {
    #[serde(rename = "PersonalInfo")]
    pub personal_info: PersonalInfo,
    #[serde(rename = "Education")]
    pub education: Vec<EducationEntry>,
    #[serde(rename = "WorkExperience")]
    pub work_experience: Vec<WorkExperienceEntry>,
    #[serde(rename = "Skills")]
    pub skills: Skills,
}

/// A persisted extraction record: either a single flat record or a
/// `pages`-wrapped mapping (`page1`, `page2`, ...) for multi-page documents.
///
/// Page-1 personal info is propagated to later pages upstream, during
/// extraction; by the time a record reaches the localizer that has already
/// happened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResumeDocument {
    Paged { pages: BTreeMap<String, ResumeData> },
    Single(ResumeData),
}

lazy_static! {
    static ref EMPTY_RECORD: ResumeData = ResumeData::default();
}

/// Key under which page `number` (1-based) is stored in a paged record.
pub fn page_key(number: usize) -> String {
    format!("page{number}")
}

impl ResumeDocument {
    pub fn is_paged(&self) -> bool {
        matches!(self, ResumeDocument::Paged { .. })
    }

    /// The record for page `number` (1-based) of a paged document.
    pub fn page(&self, number: usize) -> Option<&ResumeData> {
        match self {
            ResumeDocument::Paged { pages } => pages.get(&page_key(number)),
            ResumeDocument::Single(_) => None,
        }
    }

    /// Resolve the record to localize against for one page of a document
    /// with `page_count` rendered pages.
    ///
    /// A single record applies to every page. A paged record contributes the
    /// page's own entry when the document has multiple pages; a page with no
    /// entry (and a paged record over a single-page render) resolves to an
    /// empty record, so no fields are localized there.
    pub fn record_for_page(&self, page_index: usize, page_count: usize) -> &ResumeData {
        match self {
            ResumeDocument::Single(data) => data,
            ResumeDocument::Paged { pages } if page_count > 1 => {
                pages.get(&page_key(page_index + 1)).unwrap_or(&EMPTY_RECORD)
            }
            ResumeDocument::Paged { .. } => &EMPTY_RECORD,
        }
    }
}

// The extraction stage sometimes emits a bare string where a list belongs;
// coerce it to a one-element list (sentinel and empty strings to none).
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::One(s)) => {
            if s.is_empty() || s == NOT_FOUND {
                Vec::new()
            } else {
                vec![s]
            }
        }
        Some(StringOrList::Many(list)) => list,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "PersonalInfo": {
                "Name": "John Doe",
                "Email": "john.doe@example.com",
                "Phone": "+1234567890",
                "Location": "New York, NY"
            },
            "Education": [
                {"Degree": "Bachelor of Science", "Institution": "Test University", "GradDate": "2020"}
            ],
            "WorkExperience": [
                {"JobTitle": "Software Engineer", "Company": "Tech Company", "Duration": "2021-Present", "Responsibilities": "Developing applications"}
            ],
            "Skills": {"TechnicalSkills": ["Python", "JavaScript"], "Languages": ["English"]}
        }"#
    }

    #[test]
    fn test_deserialize_single_record() {
        let doc: ResumeDocument = serde_json::from_str(sample_json()).unwrap();
        assert!(!doc.is_paged());
        let data = doc.record_for_page(0, 1);
        assert_eq!(data.personal_info.name.as_deref(), Some("John Doe"));
        assert_eq!(data.work_experience.len(), 1);
        assert_eq!(data.skills.technical_skills, vec!["Python", "JavaScript"]);
    }

    #[test]
    fn test_deserialize_paged_record() {
        let json = format!(r#"{{"pages": {{"page1": {}, "page2": {{}}}}}}"#, sample_json());
        let doc: ResumeDocument = serde_json::from_str(&json).unwrap();
        assert!(doc.is_paged());
        assert!(doc.page(1).is_some());
        assert!(doc.page(3).is_none());
        // Page 2 exists but carries nothing.
        assert_eq!(doc.record_for_page(1, 2), &ResumeData::default());
    }

    #[test]
    fn test_record_for_page_resolution() {
        let doc: ResumeDocument =
            serde_json::from_str(&format!(r#"{{"pages": {{"page1": {}}}}}"#, sample_json())).unwrap();
        // Multi-page render: page 1 resolves to its entry, page 2 to nothing.
        assert_eq!(
            doc.record_for_page(0, 2).personal_info.name.as_deref(),
            Some("John Doe")
        );
        assert_eq!(doc.record_for_page(1, 2), &ResumeData::default());
        // Single-page render of a paged record resolves to nothing, the
        // caller is expected to unwrap page1 itself in that case.
        assert_eq!(doc.record_for_page(0, 1), &ResumeData::default());
    }

    #[test]
    fn test_skills_accept_bare_string() {
        let json = r#"{"Skills": {"TechnicalSkills": "Python", "Languages": "Not Found"}}"#;
        let data: ResumeData = serde_json::from_str(json).unwrap();
        assert_eq!(data.skills.technical_skills, vec!["Python"]);
        assert!(data.skills.languages.is_empty());
    }

    #[test]
    fn test_missing_sections_default() {
        let data: ResumeData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, ResumeData::default());
    }
}
