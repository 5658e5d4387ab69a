use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::Notification,
    services::notifications,
    state::AppState,
};

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Notification>>> {
    Ok(Json(
        notifications::list_notifications(&state, user.id()).await?,
    ))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Value>> {
    let count = notifications::unread_count(&state, user.id()).await?;
    Ok(Json(json!({ "count": count })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(notification_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    notifications::mark_read(&state, user.id(), notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Value>> {
    let updated = notifications::mark_all_read(&state, user.id()).await?;
    Ok(Json(json!({ "updated": updated })))
}
