use axum::{
    extract::State,
    Json,
};
use chrono::Utc;
use ts_services::analytics::{AuthorAnalytics, ThreadStats};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiPath, CurrentUser};
use crate::state::AppState;

pub async fn author_analytics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<AuthorAnalytics>> {
    Ok(Json(state.services.analytics.for_author(&user, Utc::now()).await?))
}

pub async fn thread_analytics(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ThreadStats>> {
    Ok(Json(state.services.analytics.for_thread(id).await?))
}
