mod memory;
mod repository;
mod service;
pub mod validation;

pub use memory::*;
pub use repository::*;
pub use service::*;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use validation::{StudentPatch, StudentPayload, StudentValidator, Violations};

/// Student as saved on storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub student_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub major: String,
    pub program: Option<String>,
    pub gpa: f64,
    pub contact_number: Option<String>,
    pub semester: Option<String>,
    pub status: Status,
    pub enrollment_date: NaiveDate,
    pub academic_standing: AcademicStanding,
    pub address: Option<Address>,
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(rename = "lastSemesterGPA")]
    pub last_semester_gpa: Option<f64>,
    pub expected_graduation_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Build the stored form of a validated [`NewStudent`].
    pub(crate) fn from_new(id: Uuid, new: &NewStudent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            student_id: new.student_id.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            date_of_birth: new.date_of_birth,
            major: new.major.clone(),
            program: new.program.clone(),
            gpa: new.gpa,
            contact_number: new.contact_number.clone(),
            semester: new.semester.clone(),
            status: new.status,
            enrollment_date: new.enrollment_date,
            academic_standing: new.academic_standing,
            address: new.address.clone(),
            emergency_contact: new.emergency_contact.clone(),
            last_semester_gpa: new.last_semester_gpa,
            expected_graduation_date: new.expected_graduation_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply supplied fields of a [`StudentPatch`].
    ///
    /// An assigned `student_id` is never overwritten.
    pub(crate) fn apply(&mut self, patch: &StudentPatch, now: DateTime<Utc>) {
        if self.student_id.is_none() {
            self.student_id = patch.student_id.clone();
        }
        if let Some(first_name) = &patch.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(date) = patch.date_of_birth {
            self.date_of_birth = date;
        }
        if let Some(major) = &patch.major {
            self.major = major.clone();
        }
        if patch.program.is_some() {
            self.program = patch.program.clone();
        }
        if let Some(gpa) = patch.gpa {
            self.gpa = gpa;
        }
        if patch.contact_number.is_some() {
            self.contact_number = patch.contact_number.clone();
        }
        if patch.semester.is_some() {
            self.semester = patch.semester.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(date) = patch.enrollment_date {
            self.enrollment_date = date;
        }
        if let Some(standing) = patch.academic_standing {
            self.academic_standing = standing;
        }
        if patch.address.is_some() {
            self.address = patch.address.clone();
        }
        if patch.emergency_contact.is_some() {
            self.emergency_contact = patch.emergency_contact.clone();
        }
        if patch.last_semester_gpa.is_some() {
            self.last_semester_gpa = patch.last_semester_gpa;
        }
        if patch.expected_graduation_date.is_some() {
            self.expected_graduation_date = patch.expected_graduation_date;
        }
        self.updated_at = now;
    }
}

/// Normalized student ready to be inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewStudent {
    pub student_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub major: String,
    pub program: Option<String>,
    pub gpa: f64,
    pub contact_number: Option<String>,
    pub semester: Option<String>,
    pub status: Status,
    pub enrollment_date: NaiveDate,
    pub academic_standing: AcademicStanding,
    pub address: Option<Address>,
    pub emergency_contact: Option<EmergencyContact>,
    pub last_semester_gpa: Option<f64>,
    pub expected_graduation_date: Option<NaiveDate>,
}

/// Postal address of a [`Student`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Person to reach for a [`Student`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub phone: Option<String>,
}

/// Enrollment status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    Inactive,
    Graduated,
    Suspended,
    #[serde(rename = "On Leave")]
    OnLeave,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Active,
        Status::Inactive,
        Status::Graduated,
        Status::Suspended,
        Status::OnLeave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::Graduated => "Graduated",
            Status::Suspended => "Suspended",
            Status::OnLeave => "On Leave",
        }
    }
}

/// Academic standing of a student.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcademicStanding {
    #[default]
    #[serde(rename = "Good Standing")]
    GoodStanding,
    #[serde(rename = "Academic Warning")]
    AcademicWarning,
    #[serde(rename = "Academic Probation")]
    AcademicProbation,
    #[serde(rename = "Academic Suspension")]
    AcademicSuspension,
}

impl AcademicStanding {
    pub const ALL: [AcademicStanding; 4] = [
        AcademicStanding::GoodStanding,
        AcademicStanding::AcademicWarning,
        AcademicStanding::AcademicProbation,
        AcademicStanding::AcademicSuspension,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AcademicStanding::GoodStanding => "Good Standing",
            AcademicStanding::AcademicWarning => "Academic Warning",
            AcademicStanding::AcademicProbation => "Academic Probation",
            AcademicStanding::AcademicSuspension => "Academic Suspension",
        }
    }
}

/// Value is not part of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant `{0}`")]
pub struct UnknownVariant(pub String);

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_owned()))
    }
}

impl FromStr for AcademicStanding {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AcademicStanding::ALL
            .into_iter()
            .find(|standing| standing.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_owned()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for AcademicStanding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Field protected by a uniqueness constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    StudentId,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UniqueField::Email => write!(f, "Email"),
            UniqueField::StudentId => write!(f, "Student ID"),
        }
    }
}

/// Column used to sort listed students.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    LastName,
    FirstName,
    Email,
    Gpa,
    StudentId,
    EnrollmentDate,
    CreatedAt,
}

impl SortKey {
    /// SQL expression backing this key. Text compares bytewise, like `str`.
    pub fn expression(&self) -> &'static str {
        match self {
            SortKey::LastName => r#"last_name COLLATE "C""#,
            SortKey::FirstName => r#"first_name COLLATE "C""#,
            SortKey::Email => r#"email COLLATE "C""#,
            SortKey::Gpa => "gpa",
            SortKey::StudentId => r#"student_id COLLATE "C""#,
            SortKey::EnrollmentDate => "enrollment_date",
            SortKey::CreatedAt => "created_at",
        }
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Options of the `list` operation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ListQuery {
    pub sort: Option<SortKey>,
    pub order: Option<SortOrder>,
    pub status: Option<Status>,
    pub major: Option<String>,
}

impl ListQuery {
    /// Whether `student` passes the filters.
    pub fn matches(&self, student: &Student) -> bool {
        self.status.is_none_or(|status| student.status == status)
            && self
                .major
                .as_deref()
                .is_none_or(|major| student.major == major)
    }

    /// Ordering of two students: requested key first, then last name,
    /// first name and id.
    pub fn compare(&self, a: &Student, b: &Student) -> Ordering {
        let requested = match self.sort {
            None => Ordering::Equal,
            // missing ids sort last in both directions
            Some(SortKey::StudentId) if a.student_id.is_none() || b.student_id.is_none() => {
                a.student_id.is_none().cmp(&b.student_id.is_none())
            },
            Some(key) => {
                let ordering = match key {
                    SortKey::LastName => a.last_name.cmp(&b.last_name),
                    SortKey::FirstName => a.first_name.cmp(&b.first_name),
                    SortKey::Email => a.email.cmp(&b.email),
                    SortKey::Gpa => a.gpa.total_cmp(&b.gpa),
                    SortKey::StudentId => a.student_id.cmp(&b.student_id),
                    SortKey::EnrollmentDate => a.enrollment_date.cmp(&b.enrollment_date),
                    SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                };
                match self.order.unwrap_or_default() {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            },
        };

        requested
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.first_name.cmp(&b.first_name))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Dashboard counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub total: usize,
    pub active: usize,
    pub new_this_month: usize,
    pub average_gpa: Option<f64>,
}
