//! Students-related HTTP API.
mod create;
mod delete;
mod get;
mod list;
mod stats;
mod update;

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::routing::get;
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::student::{StudentPayload, Violations};

/// Parse a path identifier. Anything but a UUID cannot match a record.
fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| ServerError::NotFound)
}

/// Read a request body. Only a JSON object can carry student fields.
fn read_payload(body: std::result::Result<Json<Value>, JsonRejection>) -> Result<StudentPayload> {
    let Json(body) = body?;
    if !body.is_object() {
        let mut violations = Violations::new();
        violations.add("body", "Request body must be a JSON object");
        return Err(violations.into());
    }

    serde_json::from_value(body).map_err(|err| ServerError::Internal {
        details: "cannot read student payload".into(),
        source: Some(Box::new(err)),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /api/students` goes to `list`, `POST` to `create`.
        .route("/", get(list::handler).post(create::handler))
        // `GET /api/students/stats` goes to `stats`.
        .route("/stats", get(stats::handler))
        // `GET`, `PUT` and `DELETE /api/students/{id}`.
        .route(
            "/{id}",
            get(get::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
}
