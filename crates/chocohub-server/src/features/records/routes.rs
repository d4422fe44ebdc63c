//! Record routes, mounted under `/api/v1/datasets`
//!
//! - `POST /:id/views` - register a view (cookie `view_cookie`)
//! - `POST /:id/downloads` - register a download (cookie `download_cookie`)
//!
//! Both work without a user; when `x-user-id` names a known user the record
//! is attributed to them. The cookie in use is echoed back in `Set-Cookie`.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use super::{count_for_dataset, record, RecordError, RecordKind};
use crate::api::response::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::features::shared::cookies::{read_cookie, set_cookie};
use crate::features::FeatureState;
use crate::models::ActingUser;

pub fn records_routes() -> Router<FeatureState> {
    Router::new()
        .route("/:id/views", post(register_view))
        .route("/:id/downloads", post(register_download))
}

#[derive(Debug, Serialize)]
struct RecordResponse {
    dataset_id: i64,
    created: bool,
    total: i64,
}

async fn register_view(
    State(state): State<FeatureState>,
    user: Option<ActingUser>,
    Path(dataset_id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Response> {
    handle_record(&state, RecordKind::View, dataset_id, user.map(|u| u.id), &headers).await
}

async fn register_download(
    State(state): State<FeatureState>,
    user: Option<ActingUser>,
    Path(dataset_id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Response> {
    handle_record(&state, RecordKind::Download, dataset_id, user.map(|u| u.id), &headers).await
}

#[tracing::instrument(skip(state, headers))]
async fn handle_record(
    state: &FeatureState,
    kind: RecordKind,
    dataset_id: i64,
    user_id: Option<i64>,
    headers: &HeaderMap,
) -> AppResult<Response> {
    let cookie_name = kind.cookie_name();
    let recorded = record(&state.db, kind, dataset_id, user_id, read_cookie(headers, cookie_name)).await?;
    let total = count_for_dataset(&state.db, kind, dataset_id).await?;

    let mut response = Json(ApiResponse::success(RecordResponse {
        dataset_id,
        created: recorded.created,
        total,
    }))
    .into_response();

    if let Some(value) = set_cookie(cookie_name, &recorded.cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(response)
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::DatasetNotFound(id) => AppError::NotFound(format!("Dataset {id} not found")),
            RecordError::Database(e) => AppError::Database(e),
        }
    }
}
