use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{movie::parse_tmdb_date, tmdb::TmdbEpisode, Movie};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Episode {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub season_number: i32,
    pub episode_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub still_path: Option<String>,
    pub runtime: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Upserted on (movie_id, season_number, episode_number)
#[derive(Debug, Clone, PartialEq)]
pub struct NewEpisode {
    pub movie_id: Uuid,
    pub season_number: i32,
    pub episode_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub still_path: Option<String>,
    pub runtime: Option<i32>,
}

impl NewEpisode {
    pub fn from_tmdb(movie_id: Uuid, episode: &TmdbEpisode) -> Self {
        Self {
            movie_id,
            season_number: episode.season_number,
            episode_number: episode.episode_number,
            name: episode.name.clone(),
            overview: episode.overview.clone(),
            air_date: parse_tmdb_date(episode.air_date.as_deref()),
            still_path: episode.still_path.clone(),
            runtime: episode.runtime,
        }
    }
}

/// Calendar entry: an episode together with its show
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeWithShow {
    #[serde(flatten)]
    pub episode: Episode,
    pub show: Movie,
}
