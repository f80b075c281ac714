use serde::{Deserialize, Serialize};

use crate::normalize::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub subject_id: String,
    pub subject_title: String,
}

impl Subject {
    pub fn from_record(record: &Record) -> Self {
        Self {
            subject_id: record.get("subject_id").trim().to_string(),
            subject_title: record.get("subject_title").to_string(),
        }
    }
}

/// Subject whose title matches exactly
pub fn find_by_title<'a>(subjects: &'a [Subject], title: &str) -> Option<&'a Subject> {
    subjects.iter().find(|s| s.subject_title == title)
}

/// Distinct non-blank titles in sheet order, for picking a subject
pub fn titles(subjects: &[Subject]) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    for subject in subjects {
        if !subject.subject_title.trim().is_empty() && !titles.contains(&subject.subject_title) {
            titles.push(subject.subject_title.clone());
        }
    }
    titles
}
