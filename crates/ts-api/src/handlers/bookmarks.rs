use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use ts_core::Bookmark;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRef {
    pub thread_id: Uuid,
}

pub async fn list_bookmarks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Bookmark>>> {
    Ok(Json(state.services.bookmarks.list(&user).await?))
}

pub async fn add_bookmark(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ThreadRef>,
) -> ApiResult<(StatusCode, Json<Bookmark>)> {
    let bookmark = state.services.bookmarks.add(&user, body.thread_id).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

pub async fn remove_bookmark(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(thread_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.bookmarks.remove(&user, thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
