use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::MediaType;

// ============================================================================
// TMDB v3 API Types
// ============================================================================

/// One hit of `/search/multi`; people are included by TMDB and dropped by us
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbSearchResult {
    pub id: i64,
    pub media_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

impl TmdbSearchResult {
    /// Movie or TV; `None` for people and anything else
    pub fn title_media_type(&self) -> Option<MediaType> {
        self.media_type.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<TmdbSearchResult>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbGenre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbMovieDetails {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbSeason {
    pub id: i64,
    pub season_number: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub episode_count: Option<i32>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbTvDetails {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub episode_run_time: Vec<i32>,
    #[serde(default)]
    pub number_of_seasons: Option<i32>,
    #[serde(default)]
    pub number_of_episodes: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub seasons: Vec<TmdbSeason>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbEpisode {
    pub id: i64,
    pub season_number: i32,
    pub episode_number: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

/// Response of `/tv/{id}/season/{n}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbSeasonDetails {
    pub id: i64,
    pub season_number: i32,
    #[serde(default)]
    pub episodes: Vec<TmdbEpisode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbProviderEntry {
    pub provider_id: i32,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub display_priority: Option<i32>,
}

/// Offers in one country, split by monetization
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TmdbCountryProviders {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<TmdbProviderEntry>,
    #[serde(default)]
    pub rent: Vec<TmdbProviderEntry>,
    #[serde(default)]
    pub buy: Vec<TmdbProviderEntry>,
}

/// Response of `/{media_type}/{id}/watch/providers`, keyed by country code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbWatchProviders {
    pub id: i64,
    #[serde(default)]
    pub results: HashMap<String, TmdbCountryProviders>,
}

impl TmdbWatchProviders {
    /// Subscription ("flatrate") providers for a country, empty when unknown
    pub fn flatrate_for(&self, country: &str) -> &[TmdbProviderEntry] {
        self.results
            .get(country)
            .map(|c| c.flatrate.as_slice())
            .unwrap_or_default()
    }
}

/// Details of either kind of title
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TitleDetails {
    Movie(TmdbMovieDetails),
    Tv(TmdbTvDetails),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_deserialization() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 1396, "media_type": "tv", "name": "Breaking Bad", "first_air_date": "2008-01-20", "vote_average": 8.9, "genre_ids": [18]},
                {"id": 17419, "media_type": "person", "name": "Bryan Cranston"},
                {"id": 559969, "media_type": "movie", "title": "El Camino", "poster_path": null}
            ],
            "total_pages": 1,
            "total_results": 3
        }"#;

        let response: TmdbSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 3);
        assert_eq!(response.results[0].title_media_type(), Some(MediaType::Tv));
        assert_eq!(response.results[1].title_media_type(), None);
        assert_eq!(response.results[2].title.as_deref(), Some("El Camino"));
    }

    #[test]
    fn test_tv_details_tolerates_nulls() {
        let json = r#"{
            "id": 1396,
            "name": "Breaking Bad",
            "overview": null,
            "first_air_date": "",
            "genres": [{"id": 18, "name": "Drama"}],
            "episode_run_time": [],
            "number_of_seasons": 5,
            "seasons": [{"id": 3572, "season_number": 0, "name": "Specials", "air_date": null}]
        }"#;

        let details: TmdbTvDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.number_of_seasons, Some(5));
        assert!(details.episode_run_time.is_empty());
        assert_eq!(details.seasons[0].season_number, 0);
    }

    #[test]
    fn test_watch_providers_flatrate_for_country() {
        let json = r#"{
            "id": 1396,
            "results": {
                "US": {
                    "link": "https://www.themoviedb.org/tv/1396/watch?locale=US",
                    "flatrate": [{"provider_id": 8, "provider_name": "Netflix", "logo_path": "/n.jpg", "display_priority": 0}],
                    "buy": [{"provider_id": 2, "provider_name": "Apple TV", "logo_path": "/a.jpg"}]
                },
                "GB": {"rent": [{"provider_id": 3, "provider_name": "Google Play Movies"}]}
            }
        }"#;

        let providers: TmdbWatchProviders = serde_json::from_str(json).unwrap();
        assert_eq!(providers.flatrate_for("US").len(), 1);
        assert_eq!(providers.flatrate_for("US")[0].provider_name, "Netflix");
        assert!(providers.flatrate_for("GB").is_empty());
        assert!(providers.flatrate_for("FR").is_empty());
    }
}
