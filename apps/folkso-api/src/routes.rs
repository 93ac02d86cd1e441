use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use folkso_service::{
	ContentQueryRequest, ContentQueryResponse, ServiceError, StatsRefreshReport, TagListResponse,
	TagView,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/content/query", post(query_content))
		.route("/v1/tags", get(list_tags))
		.route("/v1/tags/{slug}", get(get_tag))
		.with_state(state)
}

/// Mutating maintenance endpoints; bound to loopback only.
pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/refresh_stats", post(refresh_stats)).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn query_content(
	State(state): State<AppState>,
	Json(payload): Json<ContentQueryRequest>,
) -> Result<Json<ContentQueryResponse>, ApiError> {
	let response = state.service.query_content(payload).await?;

	Ok(Json(response))
}

async fn list_tags(State(state): State<AppState>) -> Result<Json<TagListResponse>, ApiError> {
	let response = state.service.list_tags().await?;

	Ok(Json(response))
}

async fn get_tag(
	State(state): State<AppState>,
	Path(slug): Path<String>,
) -> Result<Json<TagView>, ApiError> {
	let response = state.service.get_tag(&slug).await?;

	Ok(Json(response))
}

async fn refresh_stats(
	State(state): State<AppState>,
) -> Result<Json<StatsRefreshReport>, ApiError> {
	let response = state.service.refresh_stats().await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code) = match &err {
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			ServiceError::UnknownTag { .. } => (StatusCode::NOT_FOUND, "unknown_tag"),
			ServiceError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
		};

		Self { status, error_code, message: err.to_string() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code.to_string(), message: self.message };

		(self.status, Json(body)).into_response()
	}
}
