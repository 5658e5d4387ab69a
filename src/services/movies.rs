use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{MediaType, Movie, NewMovie, StreamingProvider, TitleDetails, TmdbSearchResult},
    services::metadata::fetch_details,
    state::AppState,
};

/// A stored title together with where it streams
#[derive(Debug, Clone, Serialize)]
pub struct MovieWithProviders {
    #[serde(flatten)]
    pub movie: Movie,
    pub providers: Vec<StreamingProvider>,
}

/// Movie and TV hits for `query`; people are dropped
pub async fn search(state: &AppState, query: &str) -> AppResult<Vec<TmdbSearchResult>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(vec![]);
    }

    let response = state.metadata.search_multi(query).await?;
    Ok(response
        .results
        .into_iter()
        .filter(|r| r.title_media_type().is_some())
        .collect())
}

pub async fn title_details(
    state: &AppState,
    media_type: MediaType,
    tmdb_id: i64,
) -> AppResult<TitleDetails> {
    fetch_details(state.metadata.as_ref(), media_type, tmdb_id).await
}

/// Upserts the local row for already-fetched details
pub async fn ensure_movie_exists(state: &AppState, details: &TitleDetails) -> AppResult<Movie> {
    let new_movie = match details {
        TitleDetails::Movie(d) => NewMovie::from(d),
        TitleDetails::Tv(d) => NewMovie::from(d),
    };

    let movie = state.store.upsert_movie(new_movie).await?;
    tracing::debug!(
        movie_id = %movie.id,
        tmdb_id = movie.tmdb_id,
        media_type = %movie.media_type,
        "Movie row ensured"
    );
    Ok(movie)
}

/// Fetches details and stores the title
pub async fn import_movie(state: &AppState, media_type: MediaType, tmdb_id: i64) -> AppResult<Movie> {
    let details = title_details(state, media_type, tmdb_id).await?;
    ensure_movie_exists(state, &details).await
}

pub async fn get_movie(state: &AppState, movie_id: Uuid) -> AppResult<Movie> {
    state
        .store
        .get_movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))
}

pub async fn movie_with_providers(
    state: &AppState,
    movie_id: Uuid,
) -> AppResult<MovieWithProviders> {
    let movie = get_movie(state, movie_id).await?;
    let providers = state.store.providers_for_movie(movie_id).await?;
    Ok(MovieWithProviders { movie, providers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TmdbMovieDetails, TmdbSearchResponse};
    use crate::services::metadata::MockMetadataProvider;
    use crate::services::test_support::{self, tv_details};

    fn hit(id: i64, media_type: &str) -> TmdbSearchResult {
        TmdbSearchResult {
            id,
            media_type: media_type.to_string(),
            title: None,
            name: Some(format!("hit {}", id)),
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            first_air_date: None,
            vote_average: None,
            genre_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_blank_search_skips_metadata() {
        let mut metadata = MockMetadataProvider::new();
        metadata.expect_search_multi().never();
        let state = test_support::state_with(metadata);

        assert!(search(&state, "   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_keeps_only_movies_and_shows() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_search_multi()
            .withf(|q| q == "dark")
            .returning(|_| {
                Ok(TmdbSearchResponse {
                    page: 1,
                    results: vec![hit(1, "tv"), hit(2, "person"), hit(3, "movie")],
                    total_pages: 1,
                    total_results: 3,
                })
            });
        let state = test_support::state_with(metadata);

        let ids: Vec<i64> = search(&state, " dark ")
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_import_is_idempotent_per_media_type() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_tv_details()
            .returning(|id| Ok(tv_details(id, "Dark", 3)));
        metadata.expect_movie_details().returning(|id| {
            Ok(TmdbMovieDetails {
                id,
                title: "Same Id Movie".to_string(),
                overview: None,
                poster_path: None,
                backdrop_path: None,
                release_date: Some("1999-03-31".to_string()),
                vote_average: None,
                genres: vec![],
                runtime: Some(136),
                tagline: None,
                status: None,
            })
        });
        let state = test_support::state_with(metadata);

        let first = import_movie(&state, MediaType::Tv, 70523).await.unwrap();
        let again = import_movie(&state, MediaType::Tv, 70523).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.number_of_seasons, Some(3));
        assert_eq!(first.runtime, Some(45));

        let movie = import_movie(&state, MediaType::Movie, 70523).await.unwrap();
        assert_ne!(movie.id, first.id);
        assert_eq!(movie.title, "Same Id Movie");
    }

    #[tokio::test]
    async fn test_missing_movie_is_not_found() {
        let state = test_support::state();
        let err = movie_with_providers(&state, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
