use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::Friendship,
    services::{
        compatibility::{self, Compatibility},
        friendships,
    },
    state::AppState,
};

/// Taste match between the caller and `user_id`
pub async fn compatibility(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Compatibility>> {
    Ok(Json(
        compatibility::compatibility_between(&state, user.id(), user_id).await?,
    ))
}

/// The friendship row between the caller and `user_id`, or null
pub async fn friendship(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Option<Friendship>>> {
    Ok(Json(
        friendships::friendship_status(&state, user.id(), user_id).await?,
    ))
}
