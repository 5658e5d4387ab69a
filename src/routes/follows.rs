use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{Follow, FollowWithMovie},
    services::follows,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct FollowStatus {
    pub movie_id: Uuid,
    pub following: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<FollowWithMovie>>> {
    Ok(Json(follows::followed_shows(&state, user.id()).await?))
}

pub async fn follow(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<Follow>)> {
    let follow = follows::follow(&state, user.id(), movie_id).await?;
    Ok((StatusCode::CREATED, Json(follow)))
}

pub async fn unfollow(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    follows::unfollow(&state, user.id(), movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<FollowStatus>> {
    let following = follows::is_following(&state, user.id(), movie_id).await?;
    Ok(Json(FollowStatus {
        movie_id,
        following,
    }))
}
