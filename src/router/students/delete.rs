//! Hard delete a student.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::error::Result;
use crate::student::StudentService;

pub async fn handler(
    State(students): State<StudentService>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = super::parse_id(&id)?;
    students.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::*;

    #[tokio::test]
    async fn test_delete_handler() {
        let state = router::state();
        let app = app(state.clone());

        let payload = serde_json::from_value(serde_json::json!({
            "firstName": "Emily",
            "lastName": "Williams",
            "email": "emily.williams@example.com",
            "dateOfBirth": "2001-03-25",
            "major": "Psychology",
            "gpa": 3.9
        }))
        .unwrap();
        let emily = state.students.create(&payload).await.unwrap();

        let path = format!("/api/students/{}", emily.id);
        let response =
            make_request(app.clone(), Method::DELETE, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Emily must be deleted.
        let response =
            make_request(app.clone(), Method::GET, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = make_request(app, Method::DELETE, &path, String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
