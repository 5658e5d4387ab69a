use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use super::tmdb::{TmdbMovieDetails, TmdbTvDetails};

/// Kind of title, as TMDB names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(format!("Unknown media type: {}", other)),
        }
    }
}

/// A movie or show mirrored locally from TMDB
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Movie {
    pub id: Uuid,
    pub tmdb_id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub vote_average: Option<f64>,
    pub genres: Vec<String>,
    pub runtime: Option<i32>,
    pub number_of_seasons: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    pub fn is_tv(&self) -> bool {
        self.media_type == MediaType::Tv
    }
}

/// Row written when a title is imported; upserted on (media_type, tmdb_id)
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub tmdb_id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub vote_average: Option<f64>,
    pub genres: Vec<String>,
    pub runtime: Option<i32>,
    pub number_of_seasons: Option<i32>,
}

/// TMDB sends "" for unknown dates
pub fn parse_tmdb_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

impl From<&TmdbMovieDetails> for NewMovie {
    fn from(details: &TmdbMovieDetails) -> Self {
        Self {
            tmdb_id: details.id,
            media_type: MediaType::Movie,
            title: details.title.clone(),
            overview: details.overview.clone(),
            poster_path: details.poster_path.clone(),
            backdrop_path: details.backdrop_path.clone(),
            release_date: parse_tmdb_date(details.release_date.as_deref()),
            vote_average: details.vote_average,
            genres: details.genres.iter().map(|g| g.name.clone()).collect(),
            runtime: details.runtime,
            number_of_seasons: None,
        }
    }
}

impl From<&TmdbTvDetails> for NewMovie {
    fn from(details: &TmdbTvDetails) -> Self {
        Self {
            tmdb_id: details.id,
            media_type: MediaType::Tv,
            title: details.name.clone(),
            overview: details.overview.clone(),
            poster_path: details.poster_path.clone(),
            backdrop_path: details.backdrop_path.clone(),
            release_date: parse_tmdb_date(details.first_air_date.as_deref()),
            vote_average: details.vote_average,
            genres: details.genres.iter().map(|g| g.name.clone()).collect(),
            runtime: details.episode_run_time.first().copied(),
            number_of_seasons: details.number_of_seasons,
        }
    }
}
