//! Dashboard counters.

use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::student::{StudentService, StudentStats};

pub async fn handler(State(students): State<StudentService>) -> Result<Json<StudentStats>> {
    Ok(Json(students.stats().await?))
}
