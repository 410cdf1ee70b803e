//! List students.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};

use crate::error::Result;
use crate::student::{ListQuery, Student, StudentService};

pub async fn handler(
    State(students): State<StudentService>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Student>>> {
    let Query(query) = query?;
    Ok(Json(students.list(&query).await?))
}
