use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Episode, EpisodeWithShow, NewEpisode},
    services::movies::get_movie,
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Week,
    Month,
    /// Caller-supplied start and end
    Range,
}

/// Inclusive date window shown by the episode calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarRange {
    pub view: CalendarView,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// `date` moved by `days`, or `InvalidInput` past the representable range
fn shift_date(date: NaiveDate, days: i64) -> AppResult<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| AppError::InvalidInput(format!("Calendar date {} is out of range", date)))
}

impl CalendarRange {
    /// Monday through Sunday of the week containing `date`
    pub fn week(date: NaiveDate) -> AppResult<Self> {
        let start = shift_date(date, -(date.weekday().num_days_from_monday() as i64))?;
        Ok(Self {
            view: CalendarView::Week,
            start,
            end: shift_date(start, 6)?,
        })
    }

    /// First through last day of the month containing `date`
    pub fn month(date: NaiveDate) -> AppResult<Self> {
        let start = shift_date(date, -(date.day0() as i64))?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Calendar date {} is out of range", date))
            })?;
        Ok(Self {
            view: CalendarView::Month,
            start,
            end,
        })
    }

    pub fn custom(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if end < start {
            return Err(AppError::InvalidInput(
                "Calendar end date is before its start date".to_string(),
            ));
        }
        Ok(Self {
            view: CalendarView::Range,
            start,
            end,
        })
    }

    pub fn next(&self) -> AppResult<Self> {
        match self.view {
            CalendarView::Week => Self::week(shift_date(self.start, 7)?),
            CalendarView::Month => Self::month(shift_date(self.end, 1)?),
            CalendarView::Range => self.shifted(self.len_days()),
        }
    }

    pub fn prev(&self) -> AppResult<Self> {
        match self.view {
            CalendarView::Week => Self::week(shift_date(self.start, -7)?),
            CalendarView::Month => Self::month(shift_date(self.start, -1)?),
            CalendarView::Range => self.shifted(-self.len_days()),
        }
    }

    fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    fn shifted(&self, days: i64) -> AppResult<Self> {
        Ok(Self {
            view: self.view,
            start: shift_date(self.start, days)?,
            end: shift_date(self.end, days)?,
        })
    }
}

/// Pulls every regular season of a show from the metadata source and
/// upserts the episodes. Any failed season fetch aborts the sync.
pub async fn sync_episodes(state: &AppState, movie_id: Uuid) -> AppResult<u64> {
    let movie = get_movie(state, movie_id).await?;
    if !movie.is_tv() {
        return Err(AppError::InvalidInput(format!(
            "{} is not a TV show",
            movie.title
        )));
    }

    let seasons = match movie.number_of_seasons {
        Some(n) => n,
        None => state
            .metadata
            .tv_details(movie.tmdb_id)
            .await?
            .number_of_seasons
            .unwrap_or(0),
    };

    let mut written = 0;
    for season in 1..=seasons {
        let details = state.metadata.season_details(movie.tmdb_id, season).await?;
        let episodes: Vec<NewEpisode> = details
            .episodes
            .iter()
            .map(|e| NewEpisode::from_tmdb(movie_id, e))
            .collect();
        written += state.store.upsert_episodes(&episodes).await?;
    }

    tracing::info!(
        movie_id = %movie_id,
        seasons,
        episodes = written,
        "Episodes synced"
    );

    Ok(written)
}

pub async fn episodes_for_show(state: &AppState, movie_id: Uuid) -> AppResult<Vec<Episode>> {
    get_movie(state, movie_id).await?;
    state.store.episodes_for_show(movie_id).await
}

/// Episodes of the user's followed shows airing in `[start, end]`
pub async fn upcoming_episodes(
    state: &AppState,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<EpisodeWithShow>> {
    let follows = state.store.follows_for_user(user_id).await?;
    if follows.is_empty() {
        return Ok(vec![]);
    }

    let movie_ids: Vec<Uuid> = follows.iter().map(|f| f.movie_id).collect();
    let episodes = state
        .store
        .episodes_airing_between(&movie_ids, start, end)
        .await?;
    let shows: HashMap<Uuid, _> = state
        .store
        .movies_by_ids(&movie_ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    Ok(episodes
        .into_iter()
        .filter_map(|episode| {
            let show = shows.get(&episode.movie_id)?.clone();
            Some(EpisodeWithShow { episode, show })
        })
        .collect())
}
