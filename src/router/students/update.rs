//! Partially update a student.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde_json::Value;

use crate::error::Result;
use crate::student::{Student, StudentService};

pub async fn handler(
    State(students): State<StudentService>,
    Path(id): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Student>> {
    let id = super::parse_id(&id)?;
    let payload = super::read_payload(body)?;

    Ok(Json(students.update(id, &payload).await?))
}
