//! Liveness probe.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::student::StudentService;

/// Health report.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    status: String,
    timestamp: DateTime<Utc>,
    version: String,
}

/// Always answers `200 OK`; `status` is `degraded` when storage is down.
pub async fn handler(State(students): State<StudentService>) -> Json<Health> {
    let status = if students.healthy().await {
        "ok"
    } else {
        "degraded"
    };

    Json(Health {
        status: status.into(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}
