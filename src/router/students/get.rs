//! Get one student.

use axum::Json;
use axum::extract::{Path, State};

use crate::error::Result;
use crate::student::{Student, StudentService};

pub async fn handler(
    State(students): State<StudentService>,
    Path(id): Path<String>,
) -> Result<Json<Student>> {
    let id = super::parse_id(&id)?;
    Ok(Json(students.get(id).await?))
}
