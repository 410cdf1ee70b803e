//! Error handler for student records.

use std::time::Duration;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::Error as SQLxError;
use thiserror::Error;

use crate::student::{UniqueField, Violations};

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(Violations),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error("student not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(UniqueField),

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),

    #[error("storage did not answer within {0:?}")]
    StorageTimeout(Duration),

    #[error("internal server error, {details}")]
    Internal {
        details: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl From<Violations> for ServerError {
    fn from(violations: Violations) -> Self {
        ServerError::Validation(violations)
    }
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    success: bool,
    #[serde(skip)]
    status: u16,
    error: String,
    errors: Vec<String>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `error` summary.
    pub fn title(mut self, title: &str) -> Self {
        self.error = title.into();
        self
    }

    /// Add field-level messages.
    pub fn errors(mut self, violations: &Violations) -> Self {
        self.errors = violations.messages();
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(self) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            success: false,
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            error: "Internal server error.".to_owned(),
            errors: Vec::new(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = match &self {
            ServerError::Validation(violations) => ResponseError::default()
                .title("There were validation errors with your request.")
                .status(StatusCode::BAD_REQUEST)
                .errors(violations),

            ServerError::Json(rejection) => ResponseError::default()
                .title(&rejection.body_text())
                .status(rejection.status()),

            ServerError::Query(rejection) => ResponseError::default()
                .title(&rejection.body_text())
                .status(rejection.status()),

            ServerError::NotFound => ResponseError::default()
                .title("Student not found.")
                .status(StatusCode::NOT_FOUND),

            ServerError::Conflict(field) => ResponseError::default()
                .title(&format!("{field} already exists."))
                .status(StatusCode::CONFLICT),

            ServerError::Sql(err) => {
                tracing::error!(error = %err, "storage request failed");
                ResponseError::default().title("Storage is unavailable.")
            },

            ServerError::StorageTimeout(timeout) => {
                tracing::error!(?timeout, "storage request timed out");
                ResponseError::default().title("Storage is unavailable.")
            },

            ServerError::Internal { details, source } => {
                tracing::error!(err = ?source, %details, "server returned 500 status");
                ResponseError::default()
            },
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "success": false,
                "error": "Internal server error.",
                "errors": [],
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
