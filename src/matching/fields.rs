use crate::models::ResumeData;
use crate::utils::NOT_FOUND;

/// Base category of a localizable field, after stripping any list-index
/// suffix (`JobTitle_2` -> `JobTitle`). Doubles as the localization
/// allow-list: names that parse to no kind are never localized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Name,
    Email,
    Phone,
    Location,
    JobTitle,
}

impl FieldKind {
    pub fn from_field_name(name: &str) -> Option<FieldKind> {
        let base = name.split('_').next().unwrap_or(name);
        match base {
            "Name" => Some(FieldKind::Name),
            "Email" => Some(FieldKind::Email),
            "Phone" => Some(FieldKind::Phone),
            "Location" => Some(FieldKind::Location),
            "JobTitle" => Some(FieldKind::JobTitle),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Name => "Name",
            FieldKind::Email => "Email",
            FieldKind::Phone => "Phone",
            FieldKind::Location => "Location",
            FieldKind::JobTitle => "JobTitle",
        }
    }
}

fn usable(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && *v != NOT_FOUND)
}

/// Project one page's record into the flat field-name -> value map of
/// localization-eligible fields: the personal-info fields plus one entry per
/// work-experience title. Education, skills, responsibilities and the other
/// long-form sections are deliberately excluded from localization.
///
/// Job titles after the first are disambiguated with the 1-based entry index
/// (`JobTitle`, `JobTitle_2`, ...); the entry index drives the suffix even
/// when earlier entries carry no title.
pub fn flatten_record(record: &ResumeData) -> Vec<(String, String)> {
    let mut flat = Vec::new();

    let info = &record.personal_info;
    let personal = [
        (FieldKind::Name, &info.name),
        (FieldKind::Email, &info.email),
        (FieldKind::Phone, &info.phone),
        (FieldKind::Location, &info.location),
    ];
    for (kind, value) in personal {
        if let Some(value) = usable(value) {
            flat.push((kind.as_str().to_string(), value.to_string()));
        }
    }

    for (index, work) in record.work_experience.iter().enumerate() {
        if let Some(title) = usable(&work.job_title) {
            let key = if index == 0 {
                "JobTitle".to_string()
            } else {
                format!("JobTitle_{}", index + 1)
            };
            flat.push((key, title.to_string()));
        }
    }

    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PersonalInfo, WorkExperienceEntry};

    fn work(title: Option<&str>) -> WorkExperienceEntry {
        WorkExperienceEntry {
            job_title: title.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_field_kind_parsing() {
        assert_eq!(FieldKind::from_field_name("Name"), Some(FieldKind::Name));
        assert_eq!(FieldKind::from_field_name("JobTitle"), Some(FieldKind::JobTitle));
        assert_eq!(FieldKind::from_field_name("JobTitle_2"), Some(FieldKind::JobTitle));
        assert_eq!(FieldKind::from_field_name("Summary"), None);
        assert_eq!(FieldKind::from_field_name("Degree_3"), None);
    }

    #[test]
    fn test_flatten_personal_info_filters_sentinel() {
        let record = ResumeData {
            personal_info: PersonalInfo {
                name: Some("John Doe".to_string()),
                email: Some("Not Found".to_string()),
                phone: Some("+1234567890".to_string()),
                location: None,
            },
            ..Default::default()
        };
        let flat = flatten_record(&record);
        assert_eq!(
            flat,
            vec![
                ("Name".to_string(), "John Doe".to_string()),
                ("Phone".to_string(), "+1234567890".to_string()),
            ]
        );
    }

    #[test]
    fn test_flatten_job_title_suffix_follows_entry_index() {
        // Titles on entries 1 and 3 only: the suffix tracks the entry index,
        // not the output order.
        let record = ResumeData {
            work_experience: vec![
                work(Some("Software Engineer")),
                work(None),
                work(Some("Team Lead")),
            ],
            ..Default::default()
        };
        let flat = flatten_record(&record);
        assert_eq!(
            flat,
            vec![
                ("JobTitle".to_string(), "Software Engineer".to_string()),
                ("JobTitle_3".to_string(), "Team Lead".to_string()),
            ]
        );
    }

    #[test]
    fn test_flatten_empty_record() {
        assert!(flatten_record(&ResumeData::default()).is_empty());
    }
}
