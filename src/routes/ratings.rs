use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{FeedItem, Rating, RatingWithMovie},
    services::ratings::{self, FeedQuery},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    /// 1-5, or 0 to clear the rating
    pub score: i32,
    pub comment: Option<String>,
}

/// 200 with the rating, or 204 when a zero score cleared it
pub async fn rate(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(movie_id): Path<Uuid>,
    Json(body): Json<RateRequest>,
) -> AppResult<Response> {
    let rating = ratings::rate(&state, user.id(), movie_id, body.score, body.comment).await?;
    Ok(match rating {
        Some(rating) => Json(rating).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn get_rating(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<Rating>> {
    Ok(Json(ratings::get_rating(&state, user.id(), movie_id).await?))
}

pub async fn delete_rating(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ratings::delete_rating(&state, user.id(), movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_ratings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<RatingWithMovie>>> {
    Ok(Json(ratings::user_ratings(&state, user_id).await?))
}

pub async fn feed(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<FeedItem>>> {
    Ok(Json(ratings::friends_feed(&state, user.id(), &query).await?))
}
