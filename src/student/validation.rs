//! Validation gate for incoming student payloads.
//!
//! Every rule is evaluated and violations are collected, so a client gets
//! the full list of problems in one response. Malformed values are reported
//! as violations, never as errors.

use std::borrow::Cow;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex_lite::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use super::{AcademicStanding, Address, EmergencyContact, NewStudent, Status};

pub const DEFAULT_STUDENT_ID_LENGTH: usize = 10;
const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern must compile")
});
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9]{10,15}$").expect("phone pattern must compile")
});

/// Reporting order of violations.
const FIELDS: &[&str] = &[
    "student_id",
    "first_name",
    "last_name",
    "email",
    "date_of_birth",
    "major",
    "program",
    "gpa",
    "contact_number",
    "semester",
    "status",
    "enrollment_date",
    "academic_standing",
    "address",
    "emergency_contact",
    "last_semester_gpa",
    "expected_graduation_date",
];

/// Raw body of a create or update request.
///
/// Values stay untyped until the gate coerces them.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub student_id: Option<Value>,
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub email: Option<Value>,
    pub date_of_birth: Option<Value>,
    pub major: Option<Value>,
    pub program: Option<Value>,
    pub gpa: Option<Value>,
    pub contact_number: Option<Value>,
    pub semester: Option<Value>,
    pub status: Option<Value>,
    pub enrollment_date: Option<Value>,
    pub academic_standing: Option<Value>,
    pub address: Option<Value>,
    pub emergency_contact: Option<Value>,
    #[serde(rename = "lastSemesterGPA", alias = "lastSemesterGpa")]
    pub last_semester_gpa: Option<Value>,
    pub expected_graduation_date: Option<Value>,
}

/// Typed, trimmed set of supplied fields.
///
/// Used as the partial update itself and as the intermediate form of a
/// creation.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct StudentPatch {
    pub student_id: Option<String>,
    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_email", message = "Please enter a valid email"))]
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub major: Option<String>,
    pub program: Option<String>,
    #[validate(range(min = 0.0, max = 4.0, message = "GPA must be between 0 and 4"))]
    pub gpa: Option<f64>,
    #[validate(custom(
        function = "validate_phone",
        message = "Please enter a valid phone number"
    ))]
    pub contact_number: Option<String>,
    pub semester: Option<String>,
    pub status: Option<Status>,
    pub enrollment_date: Option<NaiveDate>,
    pub academic_standing: Option<AcademicStanding>,
    pub address: Option<Address>,
    pub emergency_contact: Option<EmergencyContact>,
    #[validate(range(
        min = 0.0,
        max = 4.0,
        message = "Last semester GPA must be between 0 and 4"
    ))]
    pub last_semester_gpa: Option<f64>,
    pub expected_graduation_date: Option<NaiveDate>,
}

impl StudentPatch {
    /// Whether no field is supplied.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email")
            .with_message("Please enter a valid email".into()))
    }
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("phone")
            .with_message("Please enter a valid phone number".into()))
    }
}

/// One broken rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: Cow<'static, str>,
    pub message: String,
}

/// Ordered list of broken rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// An assigned `studentId` cannot be replaced.
    pub fn student_id_locked() -> Self {
        let mut violations = Self::new();
        violations.add("student_id", "Student ID cannot be changed once assigned");
        violations
    }

    /// Record a violation on `field`.
    pub fn add(
        &mut self,
        field: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) {
        self.0.push(Violation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable messages, in reporting order.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|v| v.message.clone()).collect()
    }

    fn absorb(&mut self, errors: &ValidationErrors) {
        for (field, issues) in errors.field_errors() {
            for issue in issues.iter() {
                self.add(field.to_string(), issue.to_string());
            }
        }
    }

    /// Stable sort by field, keeping rule order inside a field.
    fn sorted(mut self) -> Self {
        let rank = |field: &str| {
            FIELDS
                .iter()
                .position(|known| *known == field)
                .unwrap_or(FIELDS.len())
        };
        self.0.sort_by_key(|violation| rank(&violation.field));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// State of one raw value after coercion.
enum Input<T> {
    Absent,
    Blank,
    Invalid,
    Given(T),
}

/// Coerces raw values and records presence and type violations.
struct Reader {
    mode: Mode,
    violations: Violations,
}

impl Reader {
    fn settle<T>(
        &mut self,
        field: &'static str,
        label: &str,
        input: Input<T>,
        required: bool,
    ) -> Option<T> {
        match input {
            Input::Given(value) => Some(value),
            Input::Blank if required => {
                self.violations.add(field, format!("{label} is required"));
                None
            },
            Input::Absent if required && self.mode == Mode::Create => {
                self.violations.add(field, format!("{label} is required"));
                None
            },
            _ => None,
        }
    }

    fn text(
        &mut self,
        field: &'static str,
        label: &str,
        value: Option<&Value>,
        required: bool,
    ) -> Option<String> {
        let input = match value {
            None | Some(Value::Null) => Input::Absent,
            Some(Value::String(raw)) => match raw.trim() {
                "" => Input::Blank,
                trimmed => Input::Given(trimmed.to_owned()),
            },
            Some(_) => {
                self.violations
                    .add(field, format!("{label} must be a string"));
                Input::Invalid
            },
        };
        self.settle(field, label, input, required)
    }

    fn number(
        &mut self,
        field: &'static str,
        label: &str,
        value: Option<&Value>,
        required: bool,
    ) -> Option<f64> {
        let parsed = match value {
            None | Some(Value::Null) => Err(Input::Absent),
            Some(Value::Number(number)) => number.as_f64().ok_or(Input::Invalid),
            Some(Value::String(raw)) if raw.trim().is_empty() => Err(Input::Blank),
            Some(Value::String(raw)) => raw.trim().parse::<f64>().map_err(|_| Input::Invalid),
            Some(_) => Err(Input::Invalid),
        };
        let input = match parsed {
            Ok(number) if number.is_finite() => Input::Given(number),
            Ok(_) | Err(Input::Invalid) => {
                self.violations
                    .add(field, format!("{label} must be a number"));
                Input::Invalid
            },
            Err(other) => other,
        };
        self.settle(field, label, input, required)
    }

    fn date(
        &mut self,
        field: &'static str,
        label: &str,
        value: Option<&Value>,
        required: bool,
    ) -> Option<NaiveDate> {
        let input = match value {
            None | Some(Value::Null) => Input::Absent,
            Some(Value::String(raw)) if raw.trim().is_empty() => Input::Blank,
            Some(Value::String(raw)) => match parse_date(raw.trim()) {
                Some(date) => Input::Given(date),
                None => {
                    self.violations.add(
                        field,
                        format!("Invalid date format for {}", label.to_lowercase()),
                    );
                    Input::Invalid
                },
            },
            Some(_) => {
                self.violations.add(
                    field,
                    format!("Invalid date format for {}", label.to_lowercase()),
                );
                Input::Invalid
            },
        };
        self.settle(field, label, input, required)
    }

    fn choice<T: FromStr>(
        &mut self,
        field: &'static str,
        label: &str,
        value: Option<&Value>,
        allowed: &[&str],
        required: bool,
    ) -> Option<T> {
        let raw = self.text(field, label, value, required)?;
        match raw.parse::<T>() {
            Ok(choice) => Some(choice),
            Err(_) => {
                self.violations.add(
                    field,
                    format!("{label} must be one of: {}", allowed.join(", ")),
                );
                None
            },
        }
    }

    fn object<T: DeserializeOwned>(
        &mut self,
        field: &'static str,
        label: &str,
        value: Option<&Value>,
    ) -> Option<T> {
        match value {
            None | Some(Value::Null) => None,
            Some(object @ Value::Object(_)) => {
                match serde_json::from_value::<T>(object.clone()) {
                    Ok(parsed) => Some(parsed),
                    Err(_) => {
                        self.violations.add(
                            field,
                            format!("{label} must only contain text fields"),
                        );
                        None
                    },
                }
            },
            Some(_) => {
                self.violations
                    .add(field, format!("{label} must be an object"));
                None
            },
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|date| date.date_naive())
    })
}

fn tidy(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn tidy_address(address: Address) -> Option<Address> {
    let address = Address {
        street: tidy(address.street),
        city: tidy(address.city),
        state: tidy(address.state),
        zip_code: tidy(address.zip_code),
        country: tidy(address.country),
    };
    (address != Address::default()).then_some(address)
}

fn tidy_contact(contact: EmergencyContact) -> Option<EmergencyContact> {
    let contact = EmergencyContact {
        name: tidy(contact.name),
        relationship: tidy(contact.relationship),
        phone: tidy(contact.phone),
    };
    (contact != EmergencyContact::default()).then_some(contact)
}

/// Validation gate for student payloads.
#[derive(Debug, Clone)]
pub struct StudentValidator {
    student_id_length: usize,
    strict: bool,
}

impl Default for StudentValidator {
    fn default() -> Self {
        Self::new(DEFAULT_STUDENT_ID_LENGTH, false)
    }
}

impl StudentValidator {
    /// Create a new [`StudentValidator`].
    ///
    /// When `strict` is set the identifier is client supplied: `studentId`,
    /// `program`, `semester` and `status` become required on creation.
    pub fn new(student_id_length: usize, strict: bool) -> Self {
        Self {
            student_id_length,
            strict,
        }
    }

    /// Check a creation payload and fill defaults.
    pub fn validate_new(
        &self,
        payload: &StudentPayload,
        today: NaiveDate,
    ) -> Result<NewStudent, Violations> {
        let (patch, violations) = self.check(payload, today, Mode::Create);
        if !violations.is_empty() {
            return Err(violations);
        }

        let StudentPatch {
            student_id,
            first_name: Some(first_name),
            last_name: Some(last_name),
            email: Some(email),
            date_of_birth: Some(date_of_birth),
            major: Some(major),
            program,
            gpa: Some(gpa),
            contact_number,
            semester,
            status,
            enrollment_date,
            academic_standing,
            address,
            emergency_contact,
            last_semester_gpa,
            expected_graduation_date,
        } = patch
        else {
            // Missing required fields are always reported above.
            return Err(violations);
        };

        Ok(NewStudent {
            student_id,
            first_name,
            last_name,
            email,
            date_of_birth,
            major,
            program,
            gpa,
            contact_number,
            semester,
            status: status.unwrap_or_default(),
            enrollment_date: enrollment_date.unwrap_or(today),
            academic_standing: academic_standing.unwrap_or_default(),
            address,
            emergency_contact,
            last_semester_gpa,
            expected_graduation_date,
        })
    }

    /// Check a partial update. Absent and `null` values leave the stored
    /// field unchanged.
    pub fn validate_patch(
        &self,
        payload: &StudentPayload,
        today: NaiveDate,
    ) -> Result<StudentPatch, Violations> {
        let (patch, violations) = self.check(payload, today, Mode::Update);
        if violations.is_empty() {
            Ok(patch)
        } else {
            Err(violations)
        }
    }

    fn is_student_id(&self, id: &str) -> bool {
        id.len() == self.student_id_length
            && id
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    fn check(
        &self,
        payload: &StudentPayload,
        today: NaiveDate,
        mode: Mode,
    ) -> (StudentPatch, Violations) {
        let mut reader = Reader {
            mode,
            violations: Violations::new(),
        };
        let strict = self.strict;
        let statuses = Status::ALL.map(|s| s.as_str());
        let standings = AcademicStanding::ALL.map(|s| s.as_str());

        let patch = StudentPatch {
            student_id: reader.text(
                "student_id",
                "Student ID",
                payload.student_id.as_ref(),
                strict,
            ),
            first_name: reader.text(
                "first_name",
                "First name",
                payload.first_name.as_ref(),
                true,
            ),
            last_name: reader.text(
                "last_name",
                "Last name",
                payload.last_name.as_ref(),
                true,
            ),
            email: reader
                .text("email", "Email", payload.email.as_ref(), true)
                .map(|email| email.to_lowercase()),
            date_of_birth: reader.date(
                "date_of_birth",
                "Date of birth",
                payload.date_of_birth.as_ref(),
                true,
            ),
            major: reader.text("major", "Major", payload.major.as_ref(), true),
            program: reader.text(
                "program",
                "Program",
                payload.program.as_ref(),
                strict,
            ),
            gpa: reader.number("gpa", "GPA", payload.gpa.as_ref(), true),
            contact_number: reader.text(
                "contact_number",
                "Contact number",
                payload.contact_number.as_ref(),
                false,
            ),
            semester: reader.text(
                "semester",
                "Semester",
                payload.semester.as_ref(),
                strict,
            ),
            status: reader.choice(
                "status",
                "Status",
                payload.status.as_ref(),
                &statuses,
                strict,
            ),
            enrollment_date: reader.date(
                "enrollment_date",
                "Enrollment date",
                payload.enrollment_date.as_ref(),
                false,
            ),
            academic_standing: reader.choice(
                "academic_standing",
                "Academic standing",
                payload.academic_standing.as_ref(),
                &standings,
                false,
            ),
            address: reader
                .object::<Address>("address", "Address", payload.address.as_ref())
                .and_then(tidy_address),
            emergency_contact: reader
                .object::<EmergencyContact>(
                    "emergency_contact",
                    "Emergency contact",
                    payload.emergency_contact.as_ref(),
                )
                .and_then(tidy_contact),
            last_semester_gpa: reader.number(
                "last_semester_gpa",
                "Last semester GPA",
                payload.last_semester_gpa.as_ref(),
                false,
            ),
            expected_graduation_date: reader.date(
                "expected_graduation_date",
                "Expected graduation date",
                payload.expected_graduation_date.as_ref(),
                false,
            ),
        };

        let mut violations = reader.violations;

        if let Err(errors) = patch.validate() {
            violations.absorb(&errors);
        }

        if let Some(id) = &patch.student_id {
            if !self.is_student_id(id) {
                violations.add(
                    "student_id",
                    format!(
                        "Student ID must be {} characters (uppercase letters and numbers)",
                        self.student_id_length
                    ),
                );
            }
        }

        if patch.date_of_birth.is_some_and(|date| date > today) {
            violations.add("date_of_birth", "Date of birth cannot be in the future");
        }

        (patch, violations.sorted())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn payload(value: Value) -> StudentPayload {
        serde_json::from_value(value).unwrap()
    }

    fn john() -> Value {
        json!({
            "firstName": "John",
            "lastName": "Doe",
            "email": "john@x.com",
            "dateOfBirth": "2000-01-15",
            "major": "CS",
            "gpa": 3.8
        })
    }

    fn with(mut base: Value, key: &str, value: Value) -> Value {
        base[key] = value;
        base
    }

    #[test]
    fn test_valid_payload_gets_defaults() {
        let student = StudentValidator::default()
            .validate_new(&payload(john()), today())
            .unwrap();

        assert_eq!(student.first_name, "John");
        assert_eq!(student.email, "john@x.com");
        assert_eq!(student.gpa, 3.8);
        assert_eq!(
            student.date_of_birth,
            NaiveDate::from_ymd_opt(2000, 1, 15).unwrap()
        );
        assert_eq!(student.status, Status::Active);
        assert_eq!(student.academic_standing, AcademicStanding::GoodStanding);
        assert_eq!(student.enrollment_date, today());
        assert_eq!(student.student_id, None);
    }

    #[test]
    fn test_strings_are_trimmed_and_email_lowered() {
        let body = with(john(), "email", json!("  John.Doe@Example.COM "));
        let body = with(body, "firstName", json!("  John  "));
        let student = StudentValidator::default()
            .validate_new(&payload(body), today())
            .unwrap();

        assert_eq!(student.email, "john.doe@example.com");
        assert_eq!(student.first_name, "John");
    }

    #[test]
    fn test_gpa_bounds() {
        let validator = StudentValidator::default();

        for ok in [json!(0), json!(4), json!(4.0), json!("3.25")] {
            let body = payload(with(john(), "gpa", ok.clone()));
            assert!(validator.validate_new(&body, today()).is_ok(), "{ok}");
        }

        for bad in [json!(-0.01), json!(4.01)] {
            let body = payload(with(john(), "gpa", bad));
            let errors = validator.validate_new(&body, today()).unwrap_err();
            assert_eq!(errors.messages(), vec!["GPA must be between 0 and 4"]);
        }
    }

    #[test]
    fn test_non_numeric_gpa_is_rejected() {
        let validator = StudentValidator::default();

        for bad in [json!("abc"), json!("NaN"), json!(true), json!([3.0])] {
            let body = payload(with(john(), "gpa", bad));
            let errors = validator.validate_new(&body, today()).unwrap_err();
            assert_eq!(errors.messages(), vec!["GPA must be a number"]);
        }
    }

    #[test]
    fn test_date_of_birth_not_in_future() {
        let validator = StudentValidator::default();

        let body = payload(with(john(), "dateOfBirth", json!("2024-06-01")));
        assert!(validator.validate_new(&body, today()).is_ok());

        let body = payload(with(john(), "dateOfBirth", json!("2024-06-02")));
        let errors = validator.validate_new(&body, today()).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec!["Date of birth cannot be in the future"]
        );

        let body = payload(with(john(), "dateOfBirth", json!("2000-02-30")));
        let errors = validator.validate_new(&body, today()).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec!["Invalid date format for date of birth"]
        );
    }

    #[test]
    fn test_rfc3339_dates_keep_the_date() {
        let body = payload(with(
            john(),
            "dateOfBirth",
            json!("2000-01-15T00:00:00.000Z"),
        ));
        let student = StudentValidator::default()
            .validate_new(&body, today())
            .unwrap();
        assert_eq!(
            student.date_of_birth,
            NaiveDate::from_ymd_opt(2000, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_all_violations_are_collected_in_order() {
        let errors = StudentValidator::default()
            .validate_new(&payload(json!({})), today())
            .unwrap_err();

        assert_eq!(
            errors.messages(),
            vec![
                "First name is required",
                "Last name is required",
                "Email is required",
                "Date of birth is required",
                "Major is required",
                "GPA is required",
            ]
        );
    }

    #[test]
    fn test_mixed_violations() {
        let body = json!({
            "firstName": "J",
            "lastName": "   ",
            "email": "not-an-email",
            "dateOfBirth": "2000-01-15",
            "major": 42,
            "gpa": 5,
            "contactNumber": "12-34",
            "status": "Expelled"
        });
        let errors = StudentValidator::default()
            .validate_new(&payload(body), today())
            .unwrap_err();

        assert_eq!(
            errors.messages(),
            vec![
                "First name must be at least 2 characters",
                "Last name is required",
                "Please enter a valid email",
                "Major must be a string",
                "GPA must be between 0 and 4",
                "Please enter a valid phone number",
                "Status must be one of: Active, Inactive, Graduated, Suspended, On Leave",
            ]
        );
    }

    #[test]
    fn test_optional_fields() {
        let mut body = john();
        body["contactNumber"] = json!("+33612345678");
        body["status"] = json!("On Leave");
        body["academicStanding"] = json!("Academic Warning");
        body["lastSemesterGPA"] = json!("3.1");
        body["enrollmentDate"] = json!("2020-09-01");
        body["address"] = json!({ "city": " Paris ", "street": "" });
        body["emergencyContact"] = json!({ "name": "  ", "phone": "" });

        let student = StudentValidator::default()
            .validate_new(&payload(body), today())
            .unwrap();

        assert_eq!(student.contact_number.as_deref(), Some("+33612345678"));
        assert_eq!(student.status, Status::OnLeave);
        assert_eq!(
            student.academic_standing,
            AcademicStanding::AcademicWarning
        );
        assert_eq!(student.last_semester_gpa, Some(3.1));
        assert_eq!(
            student.enrollment_date,
            NaiveDate::from_ymd_opt(2020, 9, 1).unwrap()
        );
        assert_eq!(
            student.address,
            Some(Address {
                city: Some("Paris".into()),
                ..Default::default()
            })
        );
        assert_eq!(student.emergency_contact, None);
    }

    #[test]
    fn test_bad_sub_records() {
        let mut body = john();
        body["address"] = json!("12 main street");
        body["emergencyContact"] = json!({ "phone": 123 });
        body["lastSemesterGPA"] = json!(4.5);
        body["academicStanding"] = json!("Great");

        let errors = StudentValidator::default()
            .validate_new(&payload(body), today())
            .unwrap_err();

        assert_eq!(
            errors.messages(),
            vec![
                "Academic standing must be one of: Good Standing, Academic Warning, Academic Probation, Academic Suspension",
                "Address must be an object",
                "Emergency contact must only contain text fields",
                "Last semester GPA must be between 0 and 4",
            ]
        );
    }

    #[test]
    fn test_student_id_length() {
        let ten = StudentValidator::default();
        let eight = StudentValidator::new(8, false);

        let body = payload(with(john(), "studentId", json!("STU1234567")));
        assert!(ten.validate_new(&body, today()).is_ok());
        let errors = eight.validate_new(&body, today()).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec!["Student ID must be 8 characters (uppercase letters and numbers)"]
        );

        let body = payload(with(john(), "studentId", json!("stu1234567")));
        assert!(ten.validate_new(&body, today()).is_err());
    }

    #[test]
    fn test_strict_mode_requires_identifier() {
        let errors = StudentValidator::new(10, true)
            .validate_new(&payload(john()), today())
            .unwrap_err();

        assert_eq!(
            errors.messages(),
            vec![
                "Student ID is required",
                "Program is required",
                "Semester is required",
                "Status is required",
            ]
        );
    }

    #[test]
    fn test_patch() {
        let validator = StudentValidator::default();

        let patch = validator
            .validate_patch(&payload(json!({})), today())
            .unwrap();
        assert!(patch.is_empty());

        let patch = validator
            .validate_patch(
                &payload(json!({ "gpa": "3.9", "email": "NEW@X.com", "major": null })),
                today(),
            )
            .unwrap();
        assert_eq!(patch.gpa, Some(3.9));
        assert_eq!(patch.email.as_deref(), Some("new@x.com"));
        assert_eq!(patch.major, None);

        let errors = validator
            .validate_patch(
                &payload(json!({ "firstName": " ", "gpa": 9 })),
                today(),
            )
            .unwrap_err();
        assert_eq!(
            errors.messages(),
            vec!["First name is required", "GPA must be between 0 and 4"]
        );
    }
}
