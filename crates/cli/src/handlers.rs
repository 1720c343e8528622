//! Route adapters: parse the request, call one core operation, map the result.

use crate::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use labeler_core::labels::Tag;
use labeler_core::pagination;
use labeler_core::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

pub const LABELED_MESSAGE: &str = "image labeled and moved successfully";

#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    BadRequest(String),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } | StoreError::NoMoreResults { .. } => StatusCode::NOT_FOUND,
        StoreError::UnknownLabel { .. } => StatusCode::BAD_REQUEST,
        StoreError::MoveFailed { .. }
        | StoreError::WriteFailed { .. }
        | StoreError::EnumerationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(err) => (status_for(&err), err.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Runs blocking filesystem work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> labeler_core::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImagesPage {
    pub images: Vec<String>,
}

/// `GET /images?page=N`. A missing or unparsable page reads as 1.
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ImagesPage>, ApiError> {
    let page = params
        .get("page")
        .and_then(|p| p.trim().parse::<i64>().ok())
        .unwrap_or(1);
    let images =
        blocking(move || pagination::get_page(&state.store, page, state.page_size)).await?;
    Ok(Json(ImagesPage { images }))
}

/// `GET /image/:name`. Anything but a listed, readable file is a bare 404.
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    req: Request,
) -> Response {
    let lookup = tokio::task::spawn_blocking(move || state.store.resolve(&name)).await;
    let path = match lookup {
        Ok(Ok(path)) => path,
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "image lookup failed");
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(err) => {
            tracing::warn!(error = %err, "image lookup task failed");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    match ServeFile::new(&path).oneshot(req).await {
        Ok(res) if res.status().is_server_error() => {
            tracing::warn!(path = ?path, status = %res.status(), "failed to read image");
            StatusCode::NOT_FOUND.into_response()
        }
        Ok(res) => res.into_response(),
        Err(err) => {
            tracing::warn!(path = ?path, error = %err, "failed to serve image");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    pub image_name: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// `POST /label-image`.
pub async fn label_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LabelRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    blocking(move || state.labeler.label_image(&req.image_name, &req.tags)).await?;
    Ok(Json(MessageBody {
        message: LABELED_MESSAGE.to_string(),
    }))
}
