//! HTTP server for the course catalog.
//!
//! # API Endpoints
//!
//! | Method | Path                         | Description                          |
//! |--------|------------------------------|--------------------------------------|
//! | GET    | `/health`                    | Health check                         |
//! | GET    | `/api/courses`               | Filtered, sorted course list         |
//! | GET    | `/api/departments`           | Department filter values             |
//! | GET    | `/api/courses/{id}`          | Course with its reviews              |
//! | GET    | `/api/courses/{id}/summary`  | AI summary of the reviews            |
//! | POST   | `/api/courses/{id}/ask`      | AI answer from the reviews           |
//! | POST   | `/api/refresh`               | Re-ingest the live sheet             |
//! | GET    | `/api/logs`                  | SSE stream for real-time logs        |

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{
    error_response, AnswerResponse, AskRequest, CourseDetailResponse, CoursesResponse,
    DepartmentsResponse, RefreshResponse, SnapshotMeta, SummaryResponse,
};
use crate::ai::CourseAdvisor;
use crate::catalog::{departments, CatalogService, CatalogStore, CourseQuery};
use crate::config::AppConfig;
use crate::error::{CatalogError, ServerResult};
use crate::transform::RecordMapper;

type ApiError = (StatusCode, Json<Value>);

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub advisor: CourseAdvisor,
    pub form_url: String,
}

impl AppState {
    /// Wire source, field map and AI client from configuration.
    pub fn from_config(config: &AppConfig) -> ServerResult<Self> {
        let mapper = RecordMapper::new(config.field_map()?);
        let service = CatalogService::new(config.sheet_source(), mapper);

        Ok(Self {
            store: Arc::new(CatalogStore::new(service)),
            advisor: config.advisor(),
            form_url: config.form_url.clone(),
        })
    }
}

/// All routes, CORS included.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/courses", get(list_courses))
        .route("/api/departments", get(list_departments))
        .route("/api/courses/{id}", get(course_detail))
        .route("/api/courses/{id}/summary", get(course_summary))
        .route("/api/courses/{id}/ask", post(ask_course))
        .route("/api/refresh", post(refresh))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server. The first live refresh runs in the background so
/// the fallback catalog is served immediately.
pub async fn start_server(config: AppConfig) -> ServerResult<()> {
    let state = AppState::from_config(&config)?;

    let store = Arc::clone(&state.store);
    tokio::spawn(async move {
        store.refresh().await;
    });

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 CoursePilot server running on http://localhost:{}", config.port);
    println!("   GET  /api/courses          - Course catalog");
    println!("   GET  /api/courses/{{id}}     - Course detail");
    println!("   POST /api/refresh          - Reload the review sheet");
    println!("   GET  /api/logs             - SSE log stream");
    println!("   GET  /health               - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "coursepilot",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "courses": "GET /api/courses",
            "refresh": "POST /api/refresh",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseQuery>,
) -> Json<CoursesResponse> {
    let snapshot = state.store.snapshot().await;
    let courses = query
        .apply(&snapshot.data.courses)
        .into_iter()
        .cloned()
        .collect();

    Json(CoursesResponse {
        courses,
        sort: query.sort,
        snapshot: SnapshotMeta::new(&snapshot, state.store.is_refreshing()),
        review_form_url: state.form_url.clone(),
    })
}

async fn list_departments(State(state): State<AppState>) -> Json<DepartmentsResponse> {
    let snapshot = state.store.snapshot().await;
    Json(DepartmentsResponse {
        departments: departments(&snapshot.data.courses),
    })
}

fn not_found(id: &str) -> ApiError {
    let error = CatalogError::CourseNotFound(id.to_string());
    (StatusCode::NOT_FOUND, Json(error_response(&error.to_string())))
}

async fn course_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let snapshot = state.store.snapshot().await;
    let course = snapshot.data.course(&id).ok_or_else(|| not_found(&id))?;

    Ok(Json(CourseDetailResponse {
        course: course.clone(),
        reviews: snapshot.data.reviews_for(&id).into_iter().cloned().collect(),
    }))
}

async fn course_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let snapshot = state.store.snapshot().await;
    let course = snapshot.data.course(&id).ok_or_else(|| not_found(&id))?;

    log_info(format!("Summarizing reviews for {}", course.name));
    let summary = state
        .advisor
        .summarize(course, &snapshot.data.reviews_for(&id))
        .await;

    Ok(Json(SummaryResponse {
        course_id: id,
        summary,
    }))
}

async fn ask_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let question = request.question.trim().to_string();
    if question.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(error_response("Question must not be empty")),
        ));
    }

    let snapshot = state.store.snapshot().await;
    let course = snapshot.data.course(&id).ok_or_else(|| not_found(&id))?;

    let answer = state
        .advisor
        .ask(&question, course, &snapshot.data.reviews_for(&id))
        .await;

    Ok(Json(AnswerResponse {
        course_id: id,
        question,
        answer,
    }))
}

async fn refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    let outcome = state.store.refresh().await;
    let snapshot = state.store.snapshot().await;

    Json(RefreshResponse {
        outcome,
        snapshot: SnapshotMeta::new(&snapshot, state.store.is_refreshing()),
    })
}

/// SSE endpoint: recent history first, then live entries.
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before reading history so nothing falls between the two
    let rx = LOG_BROADCASTER.subscribe();
    let history = LOG_BROADCASTER.recent();

    let live = BroadcastStream::new(rx).filter_map(|result| result.ok());
    let stream = tokio_stream::iter(history)
        .chain(live)
        .filter_map(|entry| {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok::<Event, Infallible>(Event::default().data(json)))
        });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
