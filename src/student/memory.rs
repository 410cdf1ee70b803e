//! In-process storage used when no database is configured.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::student::{
    ListQuery, NewStudent, Student, StudentPatch, StudentRepository, UniqueField, Violations,
};

/// Student repository kept in memory.
///
/// Every write checks uniqueness and stores the record under the same lock.
#[derive(Debug, Default)]
pub struct MemoryStudentRepository {
    students: Mutex<HashMap<Uuid, Student>>,
}

impl MemoryStudentRepository {
    /// Create an empty [`MemoryStudentRepository`].
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Student>>> {
        self.students.lock().map_err(|_| ServerError::Internal {
            details: "student store lock is poisoned".into(),
            source: None,
        })
    }
}

/// Find which unique field `email` or `student_id` would collide on.
fn collision(
    students: &HashMap<Uuid, Student>,
    own: Option<Uuid>,
    email: &str,
    student_id: Option<&str>,
) -> Option<UniqueField> {
    for other in students.values().filter(|s| Some(s.id) != own) {
        if other.email.eq_ignore_ascii_case(email) {
            return Some(UniqueField::Email);
        }
        if student_id.is_some() && other.student_id.as_deref() == student_id {
            return Some(UniqueField::StudentId);
        }
    }

    None
}

#[async_trait]
impl StudentRepository for MemoryStudentRepository {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Student>> {
        let mut students: Vec<Student> = self
            .lock()?
            .values()
            .filter(|student| query.matches(student))
            .cloned()
            .collect();
        students.sort_by(|a, b| query.compare(a, b));

        Ok(students)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn insert(&self, student: &NewStudent) -> Result<Student> {
        let mut students = self.lock()?;

        if let Some(field) = collision(
            &students,
            None,
            &student.email,
            student.student_id.as_deref(),
        ) {
            return Err(ServerError::Conflict(field));
        }

        let stored = Student::from_new(Uuid::new_v4(), student, Utc::now());
        students.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update(&self, id: Uuid, patch: &StudentPatch) -> Result<Student> {
        let mut students = self.lock()?;

        let mut updated = students.get(&id).cloned().ok_or(ServerError::NotFound)?;
        if let (Some(assigned), Some(requested)) = (&updated.student_id, &patch.student_id) {
            if assigned != requested {
                return Err(Violations::student_id_locked().into());
            }
        }
        updated.apply(patch, Utc::now());

        if let Some(field) = collision(
            &students,
            Some(id),
            &updated.email,
            updated.student_id.as_deref(),
        ) {
            return Err(ServerError::Conflict(field));
        }

        students.insert(id, updated.clone());

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        match self.lock()?.remove(&id) {
            Some(_) => Ok(()),
            None => Err(ServerError::NotFound),
        }
    }

    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::student::{SortKey, SortOrder, Status, StudentPayload, StudentValidator};

    fn new_student(first: &str, last: &str, email: &str, student_id: Option<&str>) -> NewStudent {
        let payload: StudentPayload = serde_json::from_value(serde_json::json!({
            "studentId": student_id,
            "firstName": first,
            "lastName": last,
            "email": email,
            "dateOfBirth": "2000-01-15",
            "major": "Computer Science",
            "gpa": 3.1
        }))
        .unwrap();
        StudentValidator::default()
            .validate_new(&payload, Utc::now().date_naive())
            .unwrap()
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_email() {
        let repo = Arc::new(MemoryStudentRepository::new());
        let first = new_student("Ada", "Lovelace", "ada@example.com", None);
        let second = new_student("Ada", "Byron", "ADA@example.com", None);

        let (a, b) = tokio::join!(
            {
                let repo = Arc::clone(&repo);
                async move { repo.insert(&first).await }
            },
            {
                let repo = Arc::clone(&repo);
                async move { repo.insert(&second).await }
            }
        );

        let conflicts = [&a, &b]
            .iter()
            .filter(|res| matches!(res, Err(ServerError::Conflict(UniqueField::Email))))
            .count();
        assert_eq!(conflicts, 1);
        assert!(a.is_ok() || b.is_ok());
        assert_eq!(repo.list(&ListQuery::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_student_id_conflict_on_update() {
        let repo = MemoryStudentRepository::new();
        repo.insert(&new_student("John", "Doe", "john@example.com", Some("STU1234567")))
            .await
            .unwrap();
        let jane = repo
            .insert(&new_student("Jane", "Smith", "jane@example.com", None))
            .await
            .unwrap();

        let patch = StudentPatch {
            student_id: Some("STU1234567".into()),
            ..Default::default()
        };
        let err = repo.update(jane.id, &patch).await.unwrap_err();
        assert!(matches!(err, ServerError::Conflict(UniqueField::StudentId)));

        // Stored record is left untouched.
        let stored = repo.find_by_id(jane.id).await.unwrap().unwrap();
        assert_eq!(stored.student_id, None);
    }

    #[tokio::test]
    async fn test_concurrent_student_id_assignment() {
        let repo = Arc::new(MemoryStudentRepository::new());
        let jane = repo
            .insert(&new_student("Jane", "Smith", "jane@example.com", None))
            .await
            .unwrap();

        let patch = |student_id: &str| StudentPatch {
            student_id: Some(student_id.into()),
            ..Default::default()
        };
        let (first, second) = (patch("STU7654321"), patch("STU0000001"));
        let id = jane.id;

        let (a, b) = tokio::join!(
            {
                let repo = Arc::clone(&repo);
                async move { repo.update(id, &first).await }
            },
            {
                let repo = Arc::clone(&repo);
                async move { repo.update(id, &second).await }
            }
        );

        let rejected = [&a, &b]
            .iter()
            .filter(|res| matches!(res, Err(ServerError::Validation(_))))
            .count();
        assert_eq!(rejected, 1);

        let winner = a.or(b).unwrap();
        let stored = repo.find_by_id(jane.id).await.unwrap().unwrap();
        assert_eq!(stored.student_id, winner.student_id);
    }

    #[tokio::test]
    async fn test_empty_update_refreshes_timestamp() {
        let repo = MemoryStudentRepository::new();
        let created = repo
            .insert(&new_student("John", "Doe", "john@example.com", None))
            .await
            .unwrap();
        assert_eq!(created.created_at, created.updated_at);

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = repo
            .update(created.id, &StudentPatch::default())
            .await
            .unwrap();
        assert_eq!(updated.first_name, created.first_name);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let repo = MemoryStudentRepository::new();
        let created = repo
            .insert(&new_student("John", "Doe", "john@example.com", None))
            .await
            .unwrap();

        repo.delete(created.id).await.unwrap();
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), None);
        assert!(matches!(
            repo.delete(created.id).await.unwrap_err(),
            ServerError::NotFound
        ));
        assert!(matches!(
            repo.update(created.id, &StudentPatch::default())
                .await
                .unwrap_err(),
            ServerError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_missing_student_id_sorts_last() {
        let repo = MemoryStudentRepository::new();
        for (first, email, student_id) in [
            ("Ada", "ada@example.com", None),
            ("John", "john@example.com", Some("STU1234567")),
            ("Jane", "jane@example.com", Some("STU7654321")),
        ] {
            repo.insert(&new_student(first, "Doe", email, student_id))
                .await
                .unwrap();
        }

        for (order, expected) in [
            (SortOrder::Asc, ["John", "Jane", "Ada"]),
            (SortOrder::Desc, ["Jane", "John", "Ada"]),
        ] {
            let names: Vec<_> = repo
                .list(&ListQuery {
                    sort: Some(SortKey::StudentId),
                    order: Some(order),
                    ..Default::default()
                })
                .await
                .unwrap()
                .into_iter()
                .map(|s| s.first_name)
                .collect();
            assert_eq!(names, expected);
        }
    }

    #[tokio::test]
    async fn test_list_order_and_filters() {
        let repo = MemoryStudentRepository::new();
        for (first, last, email) in [
            ("Jane", "Smith", "jane@example.com"),
            ("John", "Doe", "john@example.com"),
            ("Emily", "Doe", "emily@example.com"),
        ] {
            repo.insert(&new_student(first, last, email, None))
                .await
                .unwrap();
        }

        let names: Vec<_> = repo
            .list(&ListQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|s| format!("{} {}", s.first_name, s.last_name))
            .collect();
        assert_eq!(names, vec!["Emily Doe", "John Doe", "Jane Smith"]);

        let emails: Vec<_> = repo
            .list(&ListQuery {
                sort: Some(SortKey::Email),
                order: Some(SortOrder::Desc),
                ..Default::default()
            })
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.email)
            .collect();
        assert_eq!(
            emails,
            vec!["john@example.com", "jane@example.com", "emily@example.com"]
        );

        let filtered = repo
            .list(&ListQuery {
                status: Some(Status::Graduated),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(filtered.is_empty());
    }
}
