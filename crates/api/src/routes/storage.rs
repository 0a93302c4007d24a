use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::WithRejection;
use lobianco_core::storage::{StoredObject, UploadRequest};

use crate::error::{ApiError, ApiResult};
use crate::extract::AdminCaller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/storage/upload", post(upload))
}

/// Store a base64 image and return its public URL.
async fn upload(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Json(request), _): WithRejection<Json<UploadRequest>, ApiError>,
) -> ApiResult<Json<StoredObject>> {
    Ok(Json(state.service().upload_file(&caller, request).await?))
}
