use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::student::{
    ListQuery, Status, Student, StudentPayload, StudentRepository, StudentStats,
    StudentValidator, Violations,
};

pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Student manager.
///
/// Runs the validation gate before any storage call and bounds every storage
/// call with `timeout`.
#[derive(Clone)]
pub struct StudentService {
    pub repo: Arc<dyn StudentRepository>,
    pub validator: Arc<StudentValidator>,
    timeout: Duration,
}

impl StudentService {
    /// Create a new [`StudentService`].
    pub fn new(
        repo: Arc<dyn StudentRepository>,
        validator: StudentValidator,
        timeout: Duration,
    ) -> Self {
        Self {
            repo,
            validator: Arc::new(validator),
            timeout,
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ServerError::StorageTimeout(self.timeout))?
    }

    /// List students, filtered and sorted by `query`.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Student>> {
        self.bounded(self.repo.list(query)).await
    }

    /// Find a student using its `id`.
    pub async fn get(&self, id: Uuid) -> Result<Student> {
        self.bounded(self.repo.find_by_id(id))
            .await?
            .ok_or(ServerError::NotFound)
    }

    /// Validate `payload` then store it as a new student.
    pub async fn create(&self, payload: &StudentPayload) -> Result<Student> {
        let new = self
            .validator
            .validate_new(payload, Utc::now().date_naive())?;

        let student = self.bounded(self.repo.insert(&new)).await?;
        metrics::counter!("students_created_total").increment(1);
        tracing::info!(id = %student.id, "student created");

        Ok(student)
    }

    /// Validate `payload` then apply it on student `id`.
    pub async fn update(&self, id: Uuid, payload: &StudentPayload) -> Result<Student> {
        let patch = self
            .validator
            .validate_patch(payload, Utc::now().date_naive())?;

        let current = self.get(id).await?;
        if let (Some(assigned), Some(requested)) = (&current.student_id, &patch.student_id) {
            if assigned != requested {
                return Err(Violations::student_id_locked().into());
            }
        }

        self.bounded(self.repo.update(id, &patch)).await
    }

    /// Hard delete student `id`.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.bounded(self.repo.delete(id)).await?;
        metrics::counter!("students_deleted_total").increment(1);
        tracing::info!(%id, "student deleted");

        Ok(())
    }

    /// Dashboard counters.
    pub async fn stats(&self) -> Result<StudentStats> {
        let students = self.list(&ListQuery::default()).await?;
        let today = Utc::now().date_naive();

        let total = students.len();
        let active = students
            .iter()
            .filter(|s| s.status == Status::Active)
            .count();
        let new_this_month = students
            .iter()
            .filter(|s| {
                s.enrollment_date.year() == today.year()
                    && s.enrollment_date.month() == today.month()
            })
            .count();
        let average_gpa = (total > 0)
            .then(|| students.iter().map(|s| s.gpa).sum::<f64>() / total as f64);

        Ok(StudentStats {
            total,
            active,
            new_this_month,
            average_gpa,
        })
    }

    /// Whether the storage answers in time.
    pub async fn healthy(&self) -> bool {
        match self.bounded(self.repo.ping()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "storage ping failed");
                false
            },
        }
    }
}

impl FromRef<AppState> for StudentService {
    fn from_ref(state: &AppState) -> StudentService {
        state.students.clone()
    }
}
