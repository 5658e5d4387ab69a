/// TMDB v3 client
///
/// Authenticates with the `api_key` query parameter. Every lookup is a
/// read-through of the Redis cache.
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        MediaType, TmdbMovieDetails, TmdbSearchResponse, TmdbSeasonDetails, TmdbTvDetails,
        TmdbWatchProviders,
    },
};

use super::MetadataProvider;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_CACHE_TTL: u64 = 3600;
const SEASON_CACHE_TTL: u64 = 3600;
const PROVIDERS_CACHE_TTL: u64 = 21600; // 6 hours

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = self.endpoint(path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path = %path, status = %status, "TMDB request failed");
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_multi(&self, query: &str) -> AppResult<TmdbSearchResponse> {
        cached!(
            self.cache,
            CacheKey::Search(query.to_string()),
            SEARCH_CACHE_TTL,
            async {
                let response: TmdbSearchResponse = self
                    .get_json(
                        "search/multi",
                        &[("query", query), ("include_adult", "false"), ("page", "1")],
                    )
                    .await?;
                tracing::info!(
                    query = %query,
                    result_count = response.results.len(),
                    "TMDB search completed"
                );
                AppResult::Ok(response)
            }
        )
    }

    async fn movie_details(&self, tmdb_id: i64) -> AppResult<TmdbMovieDetails> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(tmdb_id),
            DETAILS_CACHE_TTL,
            self.get_json::<TmdbMovieDetails>(&format!("movie/{}", tmdb_id), &[])
        )
    }

    async fn tv_details(&self, tmdb_id: i64) -> AppResult<TmdbTvDetails> {
        cached!(
            self.cache,
            CacheKey::TvDetails(tmdb_id),
            DETAILS_CACHE_TTL,
            self.get_json::<TmdbTvDetails>(&format!("tv/{}", tmdb_id), &[])
        )
    }

    async fn season_details(&self, tv_id: i64, season: i32) -> AppResult<TmdbSeasonDetails> {
        cached!(
            self.cache,
            CacheKey::Season { tv_id, season },
            SEASON_CACHE_TTL,
            self.get_json::<TmdbSeasonDetails>(&format!("tv/{}/season/{}", tv_id, season), &[])
        )
    }

    async fn watch_providers(
        &self,
        media_type: MediaType,
        tmdb_id: i64,
    ) -> AppResult<TmdbWatchProviders> {
        cached!(
            self.cache,
            CacheKey::WatchProviders {
                media_type,
                tmdb_id
            },
            PROVIDERS_CACHE_TTL,
            self.get_json::<TmdbWatchProviders>(
                &format!("{}/{}/watch/providers", media_type, tmdb_id),
                &[]
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;

    async fn provider(api_url: &str) -> TmdbProvider {
        // Client::open does not connect, so no Redis is needed here
        let client = create_redis_client("redis://localhost:6379").unwrap();
        let (cache, _handle) = Cache::new(client).await;
        TmdbProvider::new(cache, "test-key".to_string(), api_url.to_string())
    }

    #[tokio::test]
    async fn test_endpoint_joins_without_double_slash() {
        let tmdb = provider("https://api.themoviedb.org/3/").await;
        assert_eq!(
            tmdb.endpoint("/tv/1396/season/2"),
            "https://api.themoviedb.org/3/tv/1396/season/2"
        );

        let tmdb = provider("https://api.themoviedb.org/3").await;
        assert_eq!(
            tmdb.endpoint("movie/550"),
            "https://api.themoviedb.org/3/movie/550"
        );
    }
}
