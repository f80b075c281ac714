use crate::normalize::Record;

use super::student::EmergencyContact;

/// Status checkbox column of the `Students Registration` sheet
pub const STATUS_FIELD: &str = "status";

/// One row of the `Students Registration` sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Application {
    /// Row position in the sheet. Only meaningful within one snapshot.
    pub row: usize,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub student_type: String,
    pub age: String,
    pub preferred_bracket: String,
    pub nickname: String,
    pub contact: String,
    pub birthday: String,
    pub emergency_contact: EmergencyContact,
    pub enrolled: bool,
    pub subject_id: String,
    pub subject_title: String,
    pub section_code: String,
    pub date_enrolled: String,
}

impl Application {
    pub fn from_record(row: usize, record: &Record) -> Self {
        Self {
            row,
            student_id: record.get("student_id").trim().to_string(),
            first_name: record.get("first_name").to_string(),
            last_name: record.get("last_name").to_string(),
            student_type: record.get("student_type").to_string(),
            age: record.get("age").to_string(),
            preferred_bracket: record.get("preferred_bracket").to_string(),
            nickname: record.get("nickname").to_string(),
            contact: record.get("contact").to_string(),
            birthday: record.get("birthday").to_string(),
            emergency_contact: EmergencyContact::from_record(record),
            enrolled: record.enrolled(),
            subject_id: record.get("subject_id").trim().to_string(),
            subject_title: record.get("subject_title").to_string(),
            section_code: record.get("section_code").trim().to_string(),
            date_enrolled: record.get("date_enrolled").to_string(),
        }
    }

    pub fn has_student_id(&self) -> bool {
        !self.student_id.is_empty()
    }

    /// Blank rows left in the sheet, with no applicant name at all
    pub fn is_placeholder(&self) -> bool {
        self.first_name.trim().is_empty() && self.last_name.trim().is_empty()
    }

    /// Waiting for a subject and section
    pub fn is_pending(&self) -> bool {
        !self.enrolled && !self.is_placeholder()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;
    use serde_json::json;

    #[test]
    fn test_from_normalized_record() {
        let mut raw = crate::store::RawRecord::new();
        raw.insert("First_Name".into(), json!("Ana"));
        raw.insert("Last_Name".into(), json!("Cruz"));
        raw.insert("Student_Type".into(), json!("Regular"));
        raw.insert("Status".into(), json!("FALSE"));

        let record = Normalizer::with_status(STATUS_FIELD).normalize(&raw);
        let app = Application::from_record(3, &record);

        assert_eq!(app.row, 3);
        assert_eq!(app.full_name(), "Ana Cruz");
        assert!(!app.has_student_id());
        assert!(app.is_pending());
    }

    #[test]
    fn test_placeholder_rows_are_not_pending() {
        let app = Application::default();
        assert!(app.is_placeholder());
        assert!(!app.is_pending());

        let enrolled = Application {
            first_name: "Ana".to_string(),
            enrolled: true,
            ..Default::default()
        };
        assert!(!enrolled.is_pending());
    }
}
