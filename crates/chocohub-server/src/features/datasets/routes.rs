//! Dataset API routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/datasets` - Create a dataset from staged uploads
//! - `GET /api/v1/datasets/synchronized` - Datasets with a committed row and a directory
//! - `GET /api/v1/datasets/latest` - The five newest datasets
//! - `GET /api/v1/datasets/export` - Zip of every synchronized dataset
//! - `GET /api/v1/datasets/stats` - Hub-wide counters
//! - `GET /api/v1/datasets/:id/doi` - Public DOI URL
//! - `POST /api/v1/datasets/:id/anonymity` - Toggle anonymity (owner only)
//! - `PATCH /api/v1/datasets/:id/metadata` - Edit metadata (owner only)
//! - `POST /api/dataset/like` - Like or dislike, see [`like_routes`]

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::commands::{
    self, relocate_feature_models, CreateDataSetCommand, CreateDataSetError,
    LikeDatasetCommand, LikeDatasetError, ToggleAnonymityCommand, ToggleAnonymityError,
    UpdateDsMetaDataCommand, UpdateDsMetaDataError,
};
use super::queries::{self, ExportError, SynchronizedError};
use crate::api::response::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::features::FeatureState;
use crate::models::ActingUser;

// ============================================================================
// Router Configuration
// ============================================================================

pub fn datasets_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(create_dataset))
        .route("/synchronized", get(list_synchronized))
        .route("/latest", get(list_latest))
        .route("/export", get(export_datasets))
        .route("/stats", get(get_stats))
        .route("/:id/doi", get(get_doi))
        .route("/:id/anonymity", post(toggle_anonymity))
        .route("/:id/metadata", patch(update_metadata))
}

/// The like endpoint lives outside `/api/v1` and answers with bare JSON
pub fn like_routes() -> Router<FeatureState> {
    Router::new().route("/api/dataset/like", post(like_dataset))
}

// ============================================================================
// Command Handlers
// ============================================================================

/// Create a dataset, then move its files out of the uploader's temp folder
///
/// # Response
///
/// - `201 Created` - Dataset committed and files relocated
/// - `400 Bad Request` - Validation error
/// - `401 Unauthorized` - Missing or unknown `x-user-id`
/// - `500 Internal Server Error` - Database or filesystem error
#[tracing::instrument(skip(state, user, command), fields(user_id = user.id))]
async fn create_dataset(
    State(state): State<FeatureState>,
    user: ActingUser,
    Json(command): Json<CreateDataSetCommand>,
) -> AppResult<Response> {
    let response = commands::create::handle(&state.db, &user, command).await?;

    relocate_feature_models(&state.storage, &user, response.id, response.filenames()).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state, user), fields(user_id = user.id))]
async fn toggle_anonymity(
    State(state): State<FeatureState>,
    user: ActingUser,
    Path(dataset_id): Path<i64>,
) -> AppResult<Json<ApiResponse<commands::ToggleAnonymityResponse>>> {
    let response =
        commands::toggle_anonymity::handle(&state.db, &user, ToggleAnonymityCommand { dataset_id })
            .await?;
    Ok(Json(ApiResponse::success(response)))
}

#[tracing::instrument(skip(state, user, command), fields(user_id = user.id))]
async fn update_metadata(
    State(state): State<FeatureState>,
    user: ActingUser,
    Path(dataset_id): Path<i64>,
    Json(mut command): Json<UpdateDsMetaDataCommand>,
) -> AppResult<Json<ApiResponse<crate::models::DsMetaDataRecord>>> {
    command.dataset_id = dataset_id;
    let record = commands::update_metadata::handle(&state.db, user.id, command).await?;
    Ok(Json(ApiResponse::success(record)))
}

/// `{"total_likes": "<n>"}` on success, `{"error": "Invalid data"}` with 400
/// for anything other than a well-formed vote of 1 or -1
#[tracing::instrument(skip(state, user, body), fields(user_id = user.id))]
async fn like_dataset(
    State(state): State<FeatureState>,
    user: ActingUser,
    body: Result<Json<LikeDatasetCommand>, JsonRejection>,
) -> Response {
    let Ok(Json(command)) = body else {
        return invalid_data();
    };

    match commands::like::handle(&state.db, user.id, command).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(LikeDatasetError::InvalidValue(_)) => invalid_data(),
        Err(LikeDatasetError::DatasetNotFound(_)) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": "Dataset not found" }))).into_response()
        },
        Err(LikeDatasetError::Database(e)) => AppError::Database(e).into_response(),
    }
}

fn invalid_data() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid data" }))).into_response()
}

// ============================================================================
// Query Handlers
// ============================================================================

#[derive(Debug, Serialize)]
struct SynchronizedItem {
    dataset_id: i64,
    name: String,
}

async fn list_synchronized(
    State(state): State<FeatureState>,
) -> AppResult<Json<ApiResponse<Vec<SynchronizedItem>>>> {
    let items = queries::get_synchronized_datasets(&state.db, &state.storage)
        .await?
        .into_iter()
        .map(|d| SynchronizedItem {
            dataset_id: d.dataset_id,
            name: d.name,
        })
        .collect();
    Ok(Json(ApiResponse::success(items)))
}

async fn list_latest(
    State(state): State<FeatureState>,
) -> AppResult<Json<ApiResponse<Vec<crate::models::DataSetSummary>>>> {
    let latest = queries::synchronized::latest_synchronized(&state.db).await?;
    Ok(Json(ApiResponse::success(latest)))
}

async fn get_stats(
    State(state): State<FeatureState>,
) -> AppResult<Json<ApiResponse<queries::HubStats>>> {
    Ok(Json(ApiResponse::success(queries::stats::handle(&state.db).await?)))
}

#[derive(Debug, Serialize)]
struct DoiResponse {
    dataset_id: i64,
    doi_url: Option<String>,
}

async fn get_doi(
    State(state): State<FeatureState>,
    Path(dataset_id): Path<i64>,
) -> AppResult<Json<ApiResponse<DoiResponse>>> {
    let doi_url = queries::doi::get_doi_url(&state.db, &state.domain, dataset_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Dataset {dataset_id} not found")))?;
    Ok(Json(ApiResponse::success(DoiResponse { dataset_id, doi_url })))
}

/// Send today's archive; its temp directory goes away with `archive`
#[tracing::instrument(skip(state))]
async fn export_datasets(State(state): State<FeatureState>) -> AppResult<Response> {
    let archive = queries::generate_datasets_and_name_zip(&state.db, &state.storage).await?;
    let bytes = tokio::fs::read(&archive.path).await?;

    let disposition = format!("attachment; filename=\"{}\"", archive.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

// ============================================================================
// Error Mapping
// ============================================================================

impl From<CreateDataSetError> for AppError {
    fn from(err: CreateDataSetError) -> Self {
        let message = err.to_string();
        match err {
            CreateDataSetError::Text(_)
            | CreateDataSetError::Filename(_)
            | CreateDataSetError::Doi(_)
            | CreateDataSetError::NoFeatureModels
            | CreateDataSetError::DuplicateFilename(_)
            | CreateDataSetError::UploadMissing(_)
            | CreateDataSetError::FileTooLarge { .. } => AppError::Validation(message),
            CreateDataSetError::UnknownUser(_) => AppError::Unauthorized(message),
            CreateDataSetError::Upload(e) => AppError::Hub(e),
            CreateDataSetError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<ToggleAnonymityError> for AppError {
    fn from(err: ToggleAnonymityError) -> Self {
        let message = err.to_string();
        match err {
            ToggleAnonymityError::NotFound(_) => AppError::NotFound(message),
            ToggleAnonymityError::PermissionDenied { .. } => AppError::Forbidden(
                "You do not have permission to change this dataset".to_string(),
            ),
            ToggleAnonymityError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<UpdateDsMetaDataError> for AppError {
    fn from(err: UpdateDsMetaDataError) -> Self {
        let message = err.to_string();
        match err {
            UpdateDsMetaDataError::NoFieldsToUpdate
            | UpdateDsMetaDataError::Text(_)
            | UpdateDsMetaDataError::Doi(_) => AppError::Validation(message),
            UpdateDsMetaDataError::NotFound(_) => AppError::NotFound(message),
            UpdateDsMetaDataError::PermissionDenied { .. } => AppError::Forbidden(
                "You do not have permission to change this dataset".to_string(),
            ),
            UpdateDsMetaDataError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<SynchronizedError> for AppError {
    fn from(err: SynchronizedError) -> Self {
        match err {
            SynchronizedError::Storage(e) => AppError::Storage(e),
            SynchronizedError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Synchronized(e) => e.into(),
            ExportError::Io(e) => AppError::Io(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chocohub_common::HubError;
    use std::path::PathBuf;

    fn status_of(err: CreateDataSetError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_create_errors_map_to_statuses() {
        assert_eq!(status_of(CreateDataSetError::NoFeatureModels), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(CreateDataSetError::DuplicateFilename("car.uvl".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CreateDataSetError::UploadMissing(PathBuf::from("car.uvl"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CreateDataSetError::FileTooLarge {
                filename: "car.uvl".into(),
                size: u64::MAX,
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(CreateDataSetError::UnknownUser(9)), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(CreateDataSetError::Upload(HubError::Io(std::io::Error::other("disk")))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CreateDataSetError::Database(sqlx::Error::RowNotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
