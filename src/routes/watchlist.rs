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
    models::{WatchlistEntry, WatchlistEntryWithMovie},
    services::watchlist,
    state::AppState,
};

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<WatchlistEntryWithMovie>>> {
    Ok(Json(watchlist::list(&state, user.id()).await?))
}

pub async fn add(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<WatchlistEntry>)> {
    let entry = watchlist::add(&state, user.id(), movie_id).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    watchlist::remove(&state, user.id(), movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn contains(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let listed = watchlist::contains(&state, user.id(), movie_id).await?;
    Ok(Json(json!({ "movie_id": movie_id, "listed": listed })))
}
