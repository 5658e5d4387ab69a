use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{FeedItem, Movie, Profile, Rating, RatingWithMovie, RatingWithProfile, MAX_SCORE, MIN_SCORE},
    services::{friendships::friend_ids, movies::get_movie, subscriptions::watch_filter},
    state::AppState,
};

pub const DEFAULT_FEED_LIMIT: i64 = 20;
const MAX_FEED_LIMIT: i64 = 100;

/// Feed paging and filtering
#[derive(Debug, Clone, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_feed_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// Only titles available on the viewer's subscriptions
    #[serde(default)]
    pub only_watchable: bool,
}

fn default_feed_limit() -> i64 {
    DEFAULT_FEED_LIMIT
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FEED_LIMIT,
            offset: 0,
            only_watchable: false,
        }
    }
}

/// Sets the user's score for a title. A score of 0 clears the rating and
/// returns `None`.
pub async fn rate(
    state: &AppState,
    user_id: Uuid,
    movie_id: Uuid,
    score: i32,
    comment: Option<String>,
) -> AppResult<Option<Rating>> {
    if score == 0 {
        state.store.delete_rating(user_id, movie_id).await?;
        tracing::info!(user_id = %user_id, movie_id = %movie_id, "Rating cleared");
        return Ok(None);
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(AppError::InvalidInput(format!(
            "Score must be between {} and {}",
            MIN_SCORE, MAX_SCORE
        )));
    }

    get_movie(state, movie_id).await?;
    let comment = comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let rating = state
        .store
        .upsert_rating(user_id, movie_id, score, comment)
        .await?;

    tracing::info!(user_id = %user_id, movie_id = %movie_id, score, "Rating saved");
    Ok(Some(rating))
}

pub async fn get_rating(state: &AppState, user_id: Uuid, movie_id: Uuid) -> AppResult<Rating> {
    state
        .store
        .get_rating(user_id, movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Rating not found".to_string()))
}

pub async fn delete_rating(state: &AppState, user_id: Uuid, movie_id: Uuid) -> AppResult<()> {
    if !state.store.delete_rating(user_id, movie_id).await? {
        return Err(AppError::NotFound("Rating not found".to_string()));
    }
    tracing::info!(user_id = %user_id, movie_id = %movie_id, "Rating deleted");
    Ok(())
}

async fn movies_by_id(state: &AppState, ratings: &[Rating]) -> AppResult<HashMap<Uuid, Movie>> {
    let ids: Vec<Uuid> = ratings.iter().map(|r| r.movie_id).collect();
    Ok(state
        .store
        .movies_by_ids(&ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect())
}

async fn profiles_by_id(
    state: &AppState,
    ratings: &[Rating],
) -> AppResult<HashMap<Uuid, Profile>> {
    let ids: Vec<Uuid> = ratings.iter().map(|r| r.user_id).collect();
    Ok(state
        .store
        .profiles_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect())
}

/// A user's ratings with their titles, newest first
pub async fn user_ratings(state: &AppState, user_id: Uuid) -> AppResult<Vec<RatingWithMovie>> {
    let ratings = state.store.ratings_for_user(user_id).await?;
    let movies = movies_by_id(state, &ratings).await?;

    Ok(ratings
        .into_iter()
        .filter_map(|rating| {
            let movie = movies.get(&rating.movie_id)?.clone();
            Some(RatingWithMovie { rating, movie })
        })
        .collect())
}

/// Everyone else's ratings of a title, newest first
pub async fn movie_ratings(
    state: &AppState,
    movie_id: Uuid,
    viewer_id: Uuid,
) -> AppResult<Vec<RatingWithProfile>> {
    get_movie(state, movie_id).await?;
    let ratings: Vec<Rating> = state
        .store
        .ratings_for_movie(movie_id)
        .await?
        .into_iter()
        .filter(|r| r.user_id != viewer_id)
        .collect();
    let profiles = profiles_by_id(state, &ratings).await?;

    Ok(ratings
        .into_iter()
        .filter_map(|rating| {
            let profile = profiles.get(&rating.user_id)?.clone();
            Some(RatingWithProfile { rating, profile })
        })
        .collect())
}

/// Friends' ratings, newest first
pub async fn friends_feed(
    state: &AppState,
    user_id: Uuid,
    query: &FeedQuery,
) -> AppResult<Vec<FeedItem>> {
    let friends = friend_ids(state, user_id).await?;
    if friends.is_empty() {
        return Ok(vec![]);
    }

    let limit = query.limit.clamp(1, MAX_FEED_LIMIT);
    let offset = query.offset.max(0);

    let filter = if query.only_watchable {
        Some(watch_filter(state, user_id).await?).filter(|f| f.is_filtered())
    } else {
        None
    };

    // Filtering happens before paging so pages stay full
    let ratings = match &filter {
        None => state.store.ratings_by_users(&friends, limit, offset).await?,
        Some(filter) => state
            .store
            .ratings_by_users(&friends, i64::MAX, 0)
            .await?
            .into_iter()
            .filter(|r| filter.allows(r.movie_id))
            .skip(offset as usize)
            .take(limit as usize)
            .collect(),
    };

    let movies = movies_by_id(state, &ratings).await?;
    let profiles = profiles_by_id(state, &ratings).await?;

    let items: Vec<FeedItem> = ratings
        .into_iter()
        .filter_map(|rating| {
            let movie = movies.get(&rating.movie_id)?.clone();
            let profile = profiles.get(&rating.user_id)?.clone();
            Some(FeedItem {
                rating,
                profile,
                movie,
            })
        })
        .collect();

    tracing::debug!(
        user_id = %user_id,
        friend_count = friends.len(),
        item_count = items.len(),
        "Feed assembled"
    );

    Ok(items)
}
