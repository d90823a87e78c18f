//! REST API types.
//!
//! Field names are camelCase, like the catalog models they carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::catalog::{CatalogSnapshot, RefreshOutcome, SnapshotOrigin, SortKey};
use crate::models::{CourseEntry, ReviewEntry};

/// Which catalog version answered a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub id: String,
    pub origin: SnapshotOrigin,
    pub updated_at: DateTime<Utc>,
    pub course_count: usize,
    pub review_count: usize,
    /// A refresh is in flight.
    pub refreshing: bool,
}

impl SnapshotMeta {
    pub fn new(snapshot: &CatalogSnapshot, refreshing: bool) -> Self {
        Self {
            id: snapshot.id.clone(),
            origin: snapshot.origin,
            updated_at: snapshot.updated_at,
            course_count: snapshot.data.courses.len(),
            review_count: snapshot.data.reviews.len(),
            refreshing,
        }
    }
}

/// `GET /api/courses`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursesResponse {
    pub courses: Vec<CourseEntry>,
    pub sort: SortKey,
    pub snapshot: SnapshotMeta,
    /// Where students submit new reviews.
    pub review_form_url: String,
}

/// `GET /api/departments`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentsResponse {
    pub departments: Vec<String>,
}

/// `GET /api/courses/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailResponse {
    pub course: CourseEntry,
    pub reviews: Vec<ReviewEntry>,
}

/// `GET /api/courses/{id}/summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub course_id: String,
    pub summary: String,
}

/// `POST /api/courses/{id}/ask` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// `POST /api/courses/{id}/ask` answer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub course_id: String,
    pub question: String,
    pub answer: String,
}

/// `POST /api/refresh`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    #[serde(flatten)]
    pub outcome: RefreshOutcome,
    pub snapshot: SnapshotMeta,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let body = error_response("Course not found: X");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Course not found: X");
        assert!(Uuid::parse_str(body["requestId"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_ask_request_parses() {
        let request: AskRequest = serde_json::from_str(r#"{"question":"Is it hard?"}"#).unwrap();
        assert_eq!(request.question, "Is it hard?");
    }
}
