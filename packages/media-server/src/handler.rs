use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::AppState;
use media_store::{MediaError, ServeRequest, StorageError, StoredFile, TransformError};

#[derive(Debug, Deserialize)]
pub struct TransformQuery {
    #[serde(rename = "w")]
    pub width: Option<String>,
    #[serde(rename = "h")]
    pub height: Option<String>,
    #[serde(rename = "f")]
    pub format: Option<String>,
    #[serde(rename = "q")]
    pub quality: Option<String>,
    pub legacy: Option<String>,
}

/// 数値として読めないパラメータは「指定なし」として扱う（エラーにしない）
fn parse_lenient(value: Option<&str>) -> Option<i64> {
    value.and_then(|s| s.trim().parse().ok())
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    /// メタデータ側で解決した兄弟ファイル名（カンマ区切り）
    pub siblings: Option<String>,
    pub legacy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CacheQuery {
    pub legacy: Option<String>,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn serve_image(
    State(state): State<AppState>,
    Path((tenant, name)): Path<(String, String)>,
    Query(query): Query<TransformQuery>,
) -> Result<Response, AppError> {
    let store = state.store.clone();
    let legacy = query.legacy;
    let req = ServeRequest {
        name,
        filename: None,
        content_type: None,
        width: parse_lenient(query.width.as_deref()),
        height: parse_lenient(query.height.as_deref()),
        format: query.format,
        quality: parse_lenient(query.quality.as_deref()),
    };

    let reply = run_blocking(move || store.serve(&tenant, legacy.as_deref(), &req)).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, reply.content_type),
            (header::CACHE_CONTROL, reply.cache_control.to_string()),
        ],
        reply.bytes,
    )
        .into_response())
}

pub async fn upload(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StoredFile>, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let store = state.store.clone();
    let stored =
        run_blocking(move || store.store(&body, &query.name, &tenant, &content_type)).await?;
    Ok(Json(stored))
}

pub async fn delete_file(
    State(state): State<AppState>,
    Path((tenant, name)): Path<(String, String)>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let siblings: Vec<String> = query
        .siblings
        .as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let base_id = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.clone(),
    };

    let store = state.store.clone();
    let legacy = query.legacy;
    run_blocking(move || store.delete(&tenant, legacy.as_deref(), &base_id, &name, &siblings))
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn list_cache(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Query(query): Query<CacheQuery>,
) -> Result<Response, AppError> {
    let store = state.store.clone();
    let legacy = query.legacy;
    let listing = run_blocking(move || store.list_cache(&tenant, legacy.as_deref())).await?;
    Ok(Json(listing).into_response())
}

pub async fn clear_cache(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Query(query): Query<CacheQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = state.store.clone();
    let legacy = query.legacy;
    let cleared = run_blocking(move || store.clear_cache(&tenant, legacy.as_deref())).await?;
    Ok(Json(serde_json::json!({ "cleared_bytes": cleared })))
}

/// エンジンは同期・CPU バウンドのため、ブロッキングプールで実行する
async fn run_blocking<T>(
    f: impl FnOnce() -> Result<T, MediaError> + Send + 'static,
) -> Result<T, AppError>
where
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("worker task failed: {e}")))?
        .map_err(AppError::from)
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    TransformFailed(String),
    Internal(String),
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Validation(msg) => {
                tracing::warn!(error = %msg, "validation error");
                AppError::BadRequest(msg)
            }
            MediaError::Storage(StorageError::NotFound { name }) => {
                tracing::warn!(name = %name, "file not found");
                AppError::NotFound("file not found".to_string())
            }
            MediaError::Storage(StorageError::Io(e)) => {
                tracing::error!(error = %e, "storage io error");
                AppError::Internal("storage error".to_string())
            }
            MediaError::Transform(TransformError::InvalidParams(msg)) => {
                tracing::warn!(error = %msg, "invalid transform parameters");
                AppError::BadRequest(msg)
            }
            MediaError::Transform(e) => {
                tracing::error!(error = %e, "image processing failed");
                AppError::TransformFailed(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::TransformFailed(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
