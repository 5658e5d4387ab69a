//! Fixtures shared by the service tests

use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::MemoryStore,
    models::{
        MediaType, Movie, NewMovie, NewProfile, NewProvider, Profile, StreamingProvider,
        TmdbEpisode, TmdbSeasonDetails, TmdbTvDetails,
    },
    services::metadata::MockMetadataProvider,
    state::AppState,
};

pub fn state_with(metadata: MockMetadataProvider) -> AppState {
    AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(metadata),
        "US",
    )
}

pub async fn seeded_state_with(metadata: MockMetadataProvider) -> AppState {
    AppState::new(
        Arc::new(MemoryStore::seeded().await),
        Arc::new(metadata),
        "US",
    )
}

pub fn state() -> AppState {
    state_with(MockMetadataProvider::new())
}

pub async fn profile(state: &AppState, username: &str) -> Profile {
    state
        .store
        .create_profile(NewProfile {
            id: Uuid::new_v4(),
            username: username.to_string(),
            display_name: None,
        })
        .await
        .unwrap()
}

pub fn new_movie(media_type: MediaType, tmdb_id: i64, title: &str) -> NewMovie {
    NewMovie {
        tmdb_id,
        media_type,
        title: title.to_string(),
        overview: None,
        poster_path: None,
        backdrop_path: None,
        release_date: None,
        vote_average: None,
        genres: vec![],
        runtime: None,
        number_of_seasons: match media_type {
            MediaType::Tv => Some(1),
            MediaType::Movie => None,
        },
    }
}

pub async fn movie(state: &AppState, tmdb_id: i64, title: &str) -> Movie {
    state
        .store
        .upsert_movie(new_movie(MediaType::Movie, tmdb_id, title))
        .await
        .unwrap()
}

pub async fn show(state: &AppState, tmdb_id: i64, title: &str) -> Movie {
    state
        .store
        .upsert_movie(new_movie(MediaType::Tv, tmdb_id, title))
        .await
        .unwrap()
}

pub async fn provider(state: &AppState, tmdb_provider_id: i32, name: &str) -> StreamingProvider {
    state
        .store
        .upsert_providers(&[NewProvider {
            tmdb_provider_id,
            name: name.to_string(),
            slug: name.to_lowercase(),
            logo_path: None,
        }])
        .await
        .unwrap()
        .remove(0)
}

pub fn tv_details(tmdb_id: i64, name: &str, seasons: i32) -> TmdbTvDetails {
    TmdbTvDetails {
        id: tmdb_id,
        name: name.to_string(),
        overview: None,
        poster_path: None,
        backdrop_path: None,
        first_air_date: Some("2020-01-01".to_string()),
        vote_average: Some(8.0),
        genres: vec![],
        episode_run_time: vec![45],
        number_of_seasons: Some(seasons),
        number_of_episodes: None,
        status: None,
        tagline: None,
        seasons: vec![],
    }
}

pub fn season(season_number: i32, air_dates: &[&str]) -> TmdbSeasonDetails {
    TmdbSeasonDetails {
        id: season_number as i64,
        season_number,
        episodes: air_dates
            .iter()
            .enumerate()
            .map(|(i, date)| TmdbEpisode {
                id: (season_number * 100) as i64 + i as i64,
                season_number,
                episode_number: i as i32 + 1,
                name: Some(format!("S{}E{}", season_number, i + 1)),
                overview: None,
                air_date: Some(date.to_string()),
                still_path: None,
                runtime: Some(45),
                vote_average: None,
            })
            .collect(),
    }
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}
