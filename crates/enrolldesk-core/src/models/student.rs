use serde::{Deserialize, Serialize};

use crate::normalize::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub person: String,
    pub number: String,
    pub relationship: String,
}

impl EmergencyContact {
    pub fn from_record(record: &Record) -> Self {
        Self {
            person: record.get("emergency_contact_person").to_string(),
            number: record.get("emergency_contact_number").to_string(),
            relationship: record.get("emergency_contact_relationship").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub contact: String,
    pub birthday: String,
    pub age: String,
    pub emergency_contact: EmergencyContact,
    pub section_code: String,
    pub subject_id: String,
    pub date_enrolled: String,
}

impl Student {
    /// Column order used when a new student row is written
    pub const COLUMNS: [&'static str; 13] = [
        "student_id",
        "first_name",
        "last_name",
        "nickname",
        "contact",
        "birthday",
        "age",
        "emergency_contact_person",
        "emergency_contact_number",
        "emergency_contact_relationship",
        "section_code",
        "subject_id",
        "date_enrolled",
    ];

    pub fn from_record(record: &Record) -> Self {
        Self {
            student_id: record.get("student_id").trim().to_string(),
            first_name: record.get("first_name").to_string(),
            last_name: record.get("last_name").to_string(),
            nickname: record.get("nickname").to_string(),
            contact: record.get("contact").to_string(),
            birthday: record.get("birthday").to_string(),
            age: record.get("age").to_string(),
            emergency_contact: EmergencyContact::from_record(record),
            section_code: record.get("section_code").trim().to_string(),
            subject_id: record.get("subject_id").trim().to_string(),
            date_enrolled: record.get("date_enrolled").to_string(),
        }
    }

    pub fn to_record(&self) -> Record {
        let values = [
            &self.student_id,
            &self.first_name,
            &self.last_name,
            &self.nickname,
            &self.contact,
            &self.birthday,
            &self.age,
            &self.emergency_contact.person,
            &self.emergency_contact.number,
            &self.emergency_contact.relationship,
            &self.section_code,
            &self.subject_id,
            &self.date_enrolled,
        ];

        let mut record = Record::new();
        for (name, value) in Self::COLUMNS.iter().zip(values) {
            record.set(name, value.as_str());
        }
        record
    }
}
