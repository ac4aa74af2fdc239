use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use ts_core::{NewThread, Thread, ThreadDetail, ThreadPatch};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub tag: Option<String>,
    pub sort: Option<String>,
}

/// Accepts `{"type": ...}` or `{"reactionType": ...}`. A non-empty `type`
/// wins when both are sent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionBody {
    pub r#type: Option<String>,
    pub reaction_type: Option<String>,
}

impl ReactionBody {
    fn into_kind(self) -> String {
        self.r#type
            .filter(|kind| !kind.is_empty())
            .or(self.reaction_type)
            .unwrap_or_default()
    }
}

pub async fn create_thread(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<NewThread>,
) -> ApiResult<(StatusCode, Json<Thread>)> {
    let thread = state.services.threads.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

pub async fn get_thread(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ThreadDetail>> {
    Ok(Json(state.services.threads.get_detail(id).await?))
}

pub async fn list_threads(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Thread>>> {
    let threads = state
        .services
        .threads
        .list_public(query.tag, query.sort.as_deref())
        .await?;
    Ok(Json(threads))
}

pub async fn list_featured(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Thread>>> {
    let threads = state
        .services
        .threads
        .list_featured(query.tag, query.sort.as_deref())
        .await?;
    Ok(Json(threads))
}

pub async fn list_user_threads(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Thread>>> {
    Ok(Json(state.services.threads.list_for_author(&user).await?))
}

pub async fn update_thread(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ThreadPatch>,
) -> ApiResult<Json<Thread>> {
    Ok(Json(state.services.threads.update(id, &user, patch).await?))
}

pub async fn publish_thread(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Thread>> {
    Ok(Json(state.services.threads.publish(id, &user).await?))
}

pub async fn delete_thread(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.threads.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn fork_thread(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<(StatusCode, Json<Thread>)> {
    let fork = state.services.forks.fork(id, &user).await?;
    Ok((StatusCode::CREATED, Json(fork)))
}

pub async fn react_to_segment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath((id, segment_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<ReactionBody>,
) -> ApiResult<Json<Thread>> {
    let thread = state
        .services
        .reactions
        .apply_reaction(id, segment_id, &user, &body.into_kind())
        .await?;
    Ok(Json(thread))
}

pub async fn remove_reaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath((id, segment_id, reaction_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<Thread>> {
    let thread = state
        .services
        .reactions
        .remove_reaction(id, segment_id, reaction_id, &user)
        .await?;
    Ok(Json(thread))
}
