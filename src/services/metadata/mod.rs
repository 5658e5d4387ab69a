//! Title metadata source
//!
//! Everything the service knows about a title beyond its local row comes
//! from here: search, details, season listings and streaming offers.

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        MediaType, TitleDetails, TmdbMovieDetails, TmdbSearchResponse, TmdbSeasonDetails,
        TmdbTvDetails, TmdbWatchProviders,
    },
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Multi search across movies, shows and people
    async fn search_multi(&self, query: &str) -> AppResult<TmdbSearchResponse>;

    async fn movie_details(&self, tmdb_id: i64) -> AppResult<TmdbMovieDetails>;

    async fn tv_details(&self, tmdb_id: i64) -> AppResult<TmdbTvDetails>;

    async fn season_details(&self, tv_id: i64, season: i32) -> AppResult<TmdbSeasonDetails>;

    /// Offers for every country TMDB knows about
    async fn watch_providers(
        &self,
        media_type: MediaType,
        tmdb_id: i64,
    ) -> AppResult<TmdbWatchProviders>;
}

/// Details for a title of either media type
pub async fn fetch_details(
    metadata: &dyn MetadataProvider,
    media_type: MediaType,
    tmdb_id: i64,
) -> AppResult<TitleDetails> {
    match media_type {
        MediaType::Movie => metadata.movie_details(tmdb_id).await.map(TitleDetails::Movie),
        MediaType::Tv => metadata.tv_details(tmdb_id).await.map(TitleDetails::Tv),
    }
}
