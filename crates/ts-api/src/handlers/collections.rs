use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use ts_core::{Collection, CollectionPatch, NewCollection, ResolvedCollection};
use uuid::Uuid;

use super::bookmarks::ThreadRef;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, CurrentUser};
use crate::state::AppState;

pub async fn list_collections(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ResolvedCollection>>> {
    Ok(Json(state.services.collections.list(&user).await?))
}

pub async fn create_collection(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<NewCollection>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    let collection = state.services.collections.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn get_collection(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ResolvedCollection>> {
    Ok(Json(state.services.collections.get(id, &user).await?))
}

pub async fn update_collection(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<CollectionPatch>,
) -> ApiResult<Json<Collection>> {
    Ok(Json(state.services.collections.update(id, &user, patch).await?))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.collections.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_thread(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ThreadRef>,
) -> ApiResult<Json<Collection>> {
    let collection = state
        .services
        .collections
        .add_thread(id, &user, body.thread_id)
        .await?;
    Ok(Json(collection))
}

pub async fn remove_thread(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath((id, thread_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Collection>> {
    let collection = state
        .services
        .collections
        .remove_thread(id, &user, thread_id)
        .await?;
    Ok(Json(collection))
}
