use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::models::subject::find_by_title;
use crate::models::{
    enrollment_facts, is_enrolled_in, occupancy, Application, Membership, Section, SectionSheet,
    Student, Subject,
};

use super::error::{EnrollError, Entity};
use super::ident::next_student_id;
use super::mutation::{ApplicationUpdate, MutationSet, StudentUpsert, DATE_FORMAT};
use super::policy::EnrollmentPolicy;

/// Enrollment rules for one action: the policy plus the date to stamp
pub struct Enrollment<'a> {
    policy: &'a EnrollmentPolicy,
    today: NaiveDate,
    reserved_ids: Vec<String>,
}

impl<'a> Enrollment<'a> {
    pub fn new(policy: &'a EnrollmentPolicy, today: NaiveDate) -> Self {
        Self {
            policy,
            today,
            reserved_ids: Vec::new(),
        }
    }

    /// Ids already handed out outside the `Students` sheet (application rows,
    /// unfinished saves). A generated id never repeats one of them.
    pub fn with_reserved_ids<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.reserved_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Work out the changes that enroll `application` into the chosen subject
    /// and section, or the reason it cannot be done.
    ///
    /// Pure: every check runs against the given tables and nothing is
    /// modified. The caller applies and saves the returned `MutationSet`.
    pub fn enroll(
        &self,
        application: &Application,
        subject_choice: &str,
        section_choice: &str,
        students: &[Student],
        sections: &SectionSheet,
        subjects: &[Subject],
    ) -> Result<MutationSet, EnrollError> {
        if application.enrolled {
            return Err(EnrollError::Validation(format!(
                "Application for {} (row {}) is already enrolled",
                application.full_name(),
                application.row
            )));
        }
        if subject_choice.trim().is_empty() || section_choice.trim().is_empty() {
            return Err(EnrollError::Validation(
                "Please select both subject and section before enrolling".to_string(),
            ));
        }

        let subject = find_by_title(subjects, subject_choice)
            .ok_or_else(|| EnrollError::not_found(Entity::Subject, subject_choice))?;
        let section = resolve_section(sections, section_choice, &subject.subject_id)?;

        let facts = enrollment_facts(students, sections);
        let occupied = occupancy(&facts, &subject.subject_id, &section.section_code);
        if let Some(capacity) = self.policy.capacity.filter(|&cap| occupied >= cap) {
            return Err(EnrollError::SectionFull {
                section: section.section_code.clone(),
                occupancy: occupied,
                capacity,
            });
        }

        if application.has_student_id()
            && is_enrolled_in(
                &facts,
                &application.student_id,
                &subject.subject_id,
                &section.section_code,
            )
        {
            return Err(EnrollError::DuplicateEnrollment {
                student_id: application.student_id.clone(),
                section: section.section_code.clone(),
            });
        }

        let assigned_student_id = if application.has_student_id() {
            None
        } else {
            let in_use = students
                .iter()
                .map(|s| s.student_id.as_str())
                .chain(sections.memberships.iter().map(|m| m.student_id.as_str()))
                .chain(self.reserved_ids.iter().map(String::as_str));
            Some(next_student_id(
                in_use,
                self.today.year(),
                self.policy.program_code_for(&application.student_type),
            ))
        };
        let student_id = assigned_student_id
            .clone()
            .unwrap_or_else(|| application.student_id.clone());

        let existing = students.iter().find(|s| s.student_id.trim() == student_id);
        let student = match existing {
            Some(_) => StudentUpsert::Update {
                student_id: student_id.clone(),
                subject_id: subject.subject_id.clone(),
                section_code: section.section_code.clone(),
            },
            None => StudentUpsert::Create {
                student: self.new_student(application, &student_id, section),
            },
        };
        let previous = existing.and_then(|s| unrecorded_membership(s, sections));

        debug!(
            row = application.row,
            %student_id,
            section = %section.section_code,
            occupancy = occupied,
            generated = assigned_student_id.is_some(),
            "Enrollment validated"
        );

        Ok(MutationSet {
            student,
            previous,
            membership: Membership::new(&student_id, &section.section_code, &subject.subject_id),
            application: ApplicationUpdate {
                row: application.row,
                assigned_student_id,
                subject_id: subject.subject_id.clone(),
                subject_title: subject.subject_title.clone(),
                section_code: section.section_code.clone(),
                date_enrolled: self.today,
            },
        })
    }

    fn new_student(&self, application: &Application, student_id: &str, section: &Section) -> Student {
        Student {
            student_id: student_id.to_string(),
            first_name: application.first_name.clone(),
            last_name: application.last_name.clone(),
            nickname: application.nickname.clone(),
            contact: application.contact.clone(),
            birthday: application.birthday.clone(),
            age: application.age.clone(),
            emergency_contact: application.emergency_contact.clone(),
            section_code: section.section_code.clone(),
            subject_id: section.subject_id.clone(),
            date_enrolled: self.today.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Membership row for a student's current section when only the `Students`
/// row records it. The row is about to be overwritten, so the enrollment
/// would otherwise be lost.
fn unrecorded_membership(student: &Student, sections: &SectionSheet) -> Option<Membership> {
    let (id, code, subject_id) = (
        student.student_id.trim(),
        student.section_code.trim(),
        student.subject_id.trim(),
    );
    if code.is_empty() {
        return None;
    }
    let recorded = sections.memberships.iter().any(|m| {
        m.student_id == id
            && m.section_code == code
            && (m.subject_id.is_empty() || subject_id.is_empty() || m.subject_id == subject_id)
    });
    (!recorded).then(|| Membership::new(id, code, subject_id))
}

/// Find the section definition for `code`, preferring one under `subject_id`
fn resolve_section<'s>(
    sections: &'s SectionSheet,
    code: &str,
    subject_id: &str,
) -> Result<&'s Section, EnrollError> {
    let mut first = None;
    for section in sections.definitions(code) {
        if section.subject_id == subject_id {
            return Ok(section);
        }
        first.get_or_insert(section);
    }

    match first {
        Some(section) => Err(EnrollError::SubjectMismatch {
            section: section.section_code.clone(),
            expected: subject_id.to_string(),
            actual: section.subject_id.clone(),
        }),
        None => Err(EnrollError::not_found(Entity::Section, code.trim())),
    }
}
