//! Student records management API.
//!
//! Validates student payloads, keeps `email` and `studentId` unique and
//! stores records in PostgreSQL (or in memory for development).

#![forbid(unsafe_code)]
pub mod config;
mod database;
pub mod error;
mod router;
pub mod student;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::http::{Method, StatusCode, header};
use axum::middleware as AxumMiddleware;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};

pub use error::ServerError;
use student::{
    MemoryStudentRepository, PgStudentRepository, StudentRepository, StudentService,
    StudentValidator,
};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub students: StudentService,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout(),
        ))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any),
        );

    let mut routes = Router::new()
        // `GET /health` goes to `health`.
        .route("/health", get(router::health::handler))
        .nest("/api/students", router::students::router());

    // `GET /metrics` renders Prometheus text format.
    if let Some(handle) = state.metrics.clone() {
        routes = routes.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    routes
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: Arc<config::Configuration>,
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let timeout = database::timeout(config.postgres.as_ref());

    let repo: Arc<dyn StudentRepository> = match &config.postgres {
        Some(postgres) => Arc::new(PgStudentRepository::new(database::connect(postgres).await?)),
        None => {
            tracing::warn!(
                "missing `postgres` entry on `config.yaml` file, students are kept in memory"
            );
            Arc::new(MemoryStudentRepository::new())
        },
    };

    let validator = StudentValidator::new(
        config.validation.student_id_length,
        config.validation.require_student_id,
    );

    Ok(AppState {
        students: StudentService::new(repo, validator, timeout),
        config,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[tokio::test]
    async fn test_initialize_in_memory() {
        let state = initialize_state(Arc::new(config::Configuration::default()), None)
            .await
            .unwrap();
        assert!(state.students.healthy().await);

        let response =
            make_request(app(state), Method::GET, "/metrics", String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app(router::state());

        let response =
            make_request(app, Method::PATCH, "/api/students", String::default()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
