use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use url::Url;

use crate::AppState;
use crate::error::Result;

/// Absolute location of a student resource, relative when `base` is not a URL.
fn location(base: &str, id: &uuid::Uuid) -> String {
    let path = format!("/api/students/{id}");
    Url::parse(base)
        .and_then(|base| base.join(&path))
        .map(String::from)
        .unwrap_or(path)
}

/// Handler to create a student.
pub async fn handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let payload = super::read_payload(body)?;
    let student = state.students.create(&payload).await?;

    let mut response = (StatusCode::CREATED, Json(&student)).into_response();
    if let Ok(value) = HeaderValue::from_str(&location(&state.config.url, &student.id)) {
        response.headers_mut().insert(header::LOCATION, value);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;
    use crate::student::{Status, Student};
    use crate::*;

    async fn json_body(response: axum::http::Response<axum::body::Body>) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_create_handler() {
        let app = app(router::state());

        let req_body = json!({
            "firstName": "John",
            "lastName": "Doe",
            "email": "john@x.com",
            "dateOfBirth": "2000-01-15",
            "major": "CS",
            "gpa": 3.8
        });
        let response = make_request(
            app.clone(),
            Method::POST,
            "/api/students",
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned)
            .unwrap();

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Student = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, Status::Active);
        assert_eq!(body.enrollment_date, Utc::now().date_naive());
        assert_eq!(body.student_id, None);
        assert_eq!(
            location,
            format!("https://records.example.com/api/students/{}", body.id)
        );

        // Same email, other case.
        let req_body = json!({
            "firstName": "Johnny",
            "lastName": "Doe",
            "email": "JOHN@X.COM",
            "dateOfBirth": "2000-01-15",
            "major": "CS",
            "gpa": 3.8
        });
        let response =
            make_request(app, Method::POST, "/api/students", req_body.to_string()).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error"], "Email already exists.");
    }

    #[tokio::test]
    async fn test_create_with_invalid_fields() {
        let app = app(router::state());

        let req_body = json!({
            "firstName": "J",
            "email": "not-an-email",
            "dateOfBirth": "2000-02-30",
            "major": "CS",
            "gpa": 4.01
        });
        let response =
            make_request(app, Method::POST, "/api/students", req_body.to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "There were validation errors with your request."
        );
        let errors: Vec<String> = serde_json::from_value(body["errors"].clone()).unwrap();
        assert!(errors.contains(&"Last name is required".to_owned()));
        assert!(errors.contains(&"Please enter a valid email".to_owned()));
        assert!(errors.contains(&"Invalid date format for date of birth".to_owned()));
        assert!(errors.contains(&"GPA must be between 0 and 4".to_owned()));
    }

    #[tokio::test]
    async fn test_create_with_malformed_json() {
        let app = app(router::state());

        let response =
            make_request(app, Method::POST, "/api/students", "{\"firstName\":".into()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_create_with_non_object_body() {
        let app = app(router::state());

        for body in ["[]", "42", "null", "\"john\"", "[null,\"John\",\"Doe\"]"] {
            let response =
                make_request(app.clone(), Method::POST, "/api/students", body.into()).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body = json_body(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["errors"], json!(["Request body must be a JSON object"]));
        }

        let response =
            make_request(app, Method::GET, "/api/students", String::default()).await;
        assert_eq!(json_body(response).await, json!([]));
    }

    #[test]
    fn test_location() {
        let id = uuid::Uuid::nil();
        assert_eq!(
            location("https://records.example.com/", &id),
            "https://records.example.com/api/students/00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            location("", &id),
            "/api/students/00000000-0000-0000-0000-000000000000"
        );
    }
}
