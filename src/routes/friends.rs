use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{FriendView, Friendship},
    services::friendships,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct FriendRequestBody {
    pub addressee_id: Uuid,
}

pub async fn list_friends(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<FriendView>>> {
    Ok(Json(friendships::list_friends(&state, user.id()).await?))
}

pub async fn incoming_requests(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<FriendView>>> {
    Ok(Json(friendships::incoming_requests(&state, user.id()).await?))
}

pub async fn send_request(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<FriendRequestBody>,
) -> AppResult<(StatusCode, Json<Friendship>)> {
    let friendship = friendships::send_request(&state, user.id(), body.addressee_id).await?;
    Ok((StatusCode::CREATED, Json(friendship)))
}

pub async fn accept(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(friendship_id): Path<Uuid>,
) -> AppResult<Json<Friendship>> {
    Ok(Json(
        friendships::accept_request(&state, user.id(), friendship_id).await?,
    ))
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(friendship_id): Path<Uuid>,
) -> AppResult<Json<Friendship>> {
    Ok(Json(
        friendships::reject_request(&state, user.id(), friendship_id).await?,
    ))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(friendship_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    friendships::remove_friendship(&state, user.id(), friendship_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
