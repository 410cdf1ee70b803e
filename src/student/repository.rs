//! Handle database requests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgQueryResult;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::student::{
    AcademicStanding, Address, EmergencyContact, ListQuery, NewStudent, Status,
    Student, StudentPatch, UniqueField, Violations,
};

/// Unique index on `LOWER(email)`.
pub const EMAIL_CONSTRAINT: &str = "students_email_key";
/// Unique index on `student_id`.
pub const STUDENT_ID_CONSTRAINT: &str = "students_student_id_key";

const COLUMNS: &str = r#"
    id, student_id, first_name, last_name, email, date_of_birth, major,
    program, gpa, contact_number, semester, status, enrollment_date,
    academic_standing, address, emergency_contact, last_semester_gpa,
    expected_graduation_date, created_at, updated_at
"#;

/// Persistence of [`Student`] records.
///
/// Uniqueness of `email` and `student_id` must be enforced atomically by the
/// storage itself.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Every student matching `query`, in `query` order.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Student>>;

    /// Find a student using its `id`.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>>;

    /// Insert a new student and return the stored form.
    async fn insert(&self, student: &NewStudent) -> Result<Student>;

    /// Apply supplied fields and refresh `updated_at`.
    async fn update(&self, id: Uuid, patch: &StudentPatch) -> Result<Student>;

    /// Hard delete a student.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Check the storage answers.
    async fn ping(&self) -> Result<()>;
}

/// Student record as stored in PostgreSQL.
#[derive(Debug, Clone, FromRow)]
struct StudentRecord {
    id: Uuid,
    student_id: Option<String>,
    first_name: String,
    last_name: String,
    email: String,
    date_of_birth: NaiveDate,
    major: String,
    program: Option<String>,
    gpa: f64,
    contact_number: Option<String>,
    semester: Option<String>,
    status: String,
    enrollment_date: NaiveDate,
    academic_standing: String,
    address: Option<Json<Address>>,
    emergency_contact: Option<Json<EmergencyContact>>,
    last_semester_gpa: Option<f64>,
    expected_graduation_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StudentRecord {
    /// Convert to [`Student`].
    fn try_into_student(self) -> Result<Student> {
        let status = self.status.parse::<Status>().map_err(|err| ServerError::Internal {
            details: format!("student {} has an unknown status", self.id),
            source: Some(Box::new(err)),
        })?;
        let academic_standing =
            self.academic_standing
                .parse::<AcademicStanding>()
                .map_err(|err| ServerError::Internal {
                    details: format!("student {} has an unknown standing", self.id),
                    source: Some(Box::new(err)),
                })?;

        Ok(Student {
            id: self.id,
            student_id: self.student_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            date_of_birth: self.date_of_birth,
            major: self.major,
            program: self.program,
            gpa: self.gpa,
            contact_number: self.contact_number,
            semester: self.semester,
            status,
            enrollment_date: self.enrollment_date,
            academic_standing,
            address: self.address.map(|Json(address)| address),
            emergency_contact: self.emergency_contact.map(|Json(contact)| contact),
            last_semester_gpa: self.last_semester_gpa,
            expected_graduation_date: self.expected_graduation_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Translate unique index violations into [`ServerError::Conflict`].
fn catch_conflict(err: sqlx::Error) -> ServerError {
    let field = err
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .and_then(|db| match db.constraint() {
            Some(EMAIL_CONSTRAINT) => Some(UniqueField::Email),
            Some(STUDENT_ID_CONSTRAINT) => Some(UniqueField::StudentId),
            _ => None,
        });

    match field {
        Some(field) => ServerError::Conflict(field),
        None => ServerError::Sql(err),
    }
}

/// PostgreSQL student repository.
#[derive(Clone)]
pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    /// Create a new [`PgStudentRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Student>> {
        let order = match query.sort {
            Some(key) => format!(
                "{} {} NULLS LAST, ",
                key.expression(),
                query.order.unwrap_or_default().keyword()
            ),
            None => String::default(),
        };
        let sql = format!(
            r#"SELECT {COLUMNS}
            FROM students
            WHERE ($1::TEXT IS NULL OR status = $1)
                AND ($2::TEXT IS NULL OR major = $2)
            ORDER BY {order}last_name COLLATE "C" ASC, first_name COLLATE "C" ASC, id ASC"#
        );

        let records = sqlx::query_as::<_, StudentRecord>(&sql)
            .bind(query.status.map(|status| status.as_str()))
            .bind(query.major.as_deref())
            .fetch_all(&self.pool)
            .await?;

        records
            .into_iter()
            .map(StudentRecord::try_into_student)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>> {
        let record = sqlx::query_as::<_, StudentRecord>(&format!(
            "SELECT {COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(StudentRecord::try_into_student).transpose()
    }

    async fn insert(&self, student: &NewStudent) -> Result<Student> {
        let record = sqlx::query_as::<_, StudentRecord>(&format!(
            r#"INSERT INTO students (
                student_id, first_name, last_name, email, date_of_birth,
                major, program, gpa, contact_number, semester, status,
                enrollment_date, academic_standing, address,
                emergency_contact, last_semester_gpa, expected_graduation_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {COLUMNS}"#
        ))
        .bind(&student.student_id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .bind(student.date_of_birth)
        .bind(&student.major)
        .bind(&student.program)
        .bind(student.gpa)
        .bind(&student.contact_number)
        .bind(&student.semester)
        .bind(student.status.as_str())
        .bind(student.enrollment_date)
        .bind(student.academic_standing.as_str())
        .bind(student.address.as_ref().map(Json))
        .bind(student.emergency_contact.as_ref().map(Json))
        .bind(student.last_semester_gpa)
        .bind(student.expected_graduation_date)
        .fetch_one(&self.pool)
        .await
        .map_err(catch_conflict)?;

        record.try_into_student()
    }

    async fn update(&self, id: Uuid, patch: &StudentPatch) -> Result<Student> {
        let record = sqlx::query_as::<_, StudentRecord>(&format!(
            r#"UPDATE students
            SET
                student_id = COALESCE(student_id, $2),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                date_of_birth = COALESCE($6, date_of_birth),
                major = COALESCE($7, major),
                program = COALESCE($8, program),
                gpa = COALESCE($9, gpa),
                contact_number = COALESCE($10, contact_number),
                semester = COALESCE($11, semester),
                status = COALESCE($12, status),
                enrollment_date = COALESCE($13, enrollment_date),
                academic_standing = COALESCE($14, academic_standing),
                address = COALESCE($15, address),
                emergency_contact = COALESCE($16, emergency_contact),
                last_semester_gpa = COALESCE($17, last_semester_gpa),
                expected_graduation_date = COALESCE($18, expected_graduation_date),
                updated_at = NOW()
            WHERE id = $1
                AND (student_id IS NULL OR $2::TEXT IS NULL OR student_id = $2)
            RETURNING {COLUMNS}"#
        ))
        .bind(id)
        .bind(&patch.student_id)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.email)
        .bind(patch.date_of_birth)
        .bind(&patch.major)
        .bind(&patch.program)
        .bind(patch.gpa)
        .bind(&patch.contact_number)
        .bind(&patch.semester)
        .bind(patch.status.map(|status| status.as_str()))
        .bind(patch.enrollment_date)
        .bind(patch.academic_standing.map(|standing| standing.as_str()))
        .bind(patch.address.as_ref().map(Json))
        .bind(patch.emergency_contact.as_ref().map(Json))
        .bind(patch.last_semester_gpa)
        .bind(patch.expected_graduation_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(catch_conflict)?;

        match record {
            Some(record) => record.try_into_student(),
            // row exists but keeps another `student_id`.
            None if self.find_by_id(id).await?.is_some() => {
                Err(Violations::student_id_locked().into())
            },
            None => Err(ServerError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result: PgQueryResult = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
