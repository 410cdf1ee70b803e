//! HTTP API.
pub mod health;
pub mod students;

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::AppState;

/// Application state backed by the in-memory repository.
#[cfg(test)]
pub fn state() -> AppState {
    use crate::config::Configuration;
    use crate::student::{
        DEFAULT_STORAGE_TIMEOUT, MemoryStudentRepository, StudentService, StudentValidator,
    };

    AppState {
        config: Arc::new(Configuration {
            url: "https://records.example.com/".into(),
            ..Default::default()
        }),
        students: StudentService::new(
            Arc::new(MemoryStudentRepository::new()),
            StudentValidator::default(),
            DEFAULT_STORAGE_TIMEOUT,
        ),
        metrics: None,
    }
}
