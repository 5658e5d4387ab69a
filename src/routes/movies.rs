use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::CurrentUser,
    models::{
        Episode, MediaType, Movie, RatingWithProfile, StreamingProvider, TitleDetails,
        TmdbSearchResult,
    },
    services::{episodes, movies, provider_sync, ratings},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Two-letter region; the configured one when absent
#[derive(Debug, Deserialize)]
pub struct ProviderSyncQuery {
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EpisodeSyncResponse {
    pub movie_id: Uuid,
    pub episodes: u64,
}

fn parse_media_type(raw: &str) -> AppResult<MediaType> {
    raw.parse()
        .map_err(|_| AppError::InvalidInput(format!("Unknown media type: {}", raw)))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<TmdbSearchResult>>> {
    Ok(Json(movies::search(&state, &query.q).await?))
}

/// Details straight from the metadata source, without storing anything
pub async fn tmdb_details(
    State(state): State<AppState>,
    Path((media_type, tmdb_id)): Path<(String, i64)>,
) -> AppResult<Json<TitleDetails>> {
    let media_type = parse_media_type(&media_type)?;
    Ok(Json(movies::title_details(&state, media_type, tmdb_id).await?))
}

pub async fn import(
    State(state): State<AppState>,
    Path((media_type, tmdb_id)): Path<(String, i64)>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let media_type = parse_media_type(&media_type)?;
    let movie = movies::import_movie(&state, media_type, tmdb_id).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<movies::MovieWithProviders>> {
    Ok(Json(movies::movie_with_providers(&state, movie_id).await?))
}

pub async fn movie_ratings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<Vec<RatingWithProfile>>> {
    Ok(Json(
        ratings::movie_ratings(&state, movie_id, user.id()).await?,
    ))
}

pub async fn sync_providers(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
    Query(query): Query<ProviderSyncQuery>,
) -> AppResult<Json<Vec<StreamingProvider>>> {
    Ok(Json(
        provider_sync::sync_movie_providers(&state, movie_id, query.country.as_deref()).await?,
    ))
}

pub async fn sync_episodes(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<EpisodeSyncResponse>> {
    let episodes = episodes::sync_episodes(&state, movie_id).await?;
    Ok(Json(EpisodeSyncResponse { movie_id, episodes }))
}

pub async fn list_episodes(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<Vec<Episode>>> {
    Ok(Json(episodes::episodes_for_show(&state, movie_id).await?))
}
