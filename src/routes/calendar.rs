use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::CurrentUser,
    models::EpisodeWithShow,
    services::episodes::{self, CalendarRange, CalendarView},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub view: Option<CalendarView>,
    /// Any day inside the requested week or month; defaults to today
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub range: CalendarRange,
    pub prev: CalendarRange,
    pub next: CalendarRange,
    pub episodes: Vec<EpisodeWithShow>,
}

impl CalendarQuery {
    fn range(&self) -> AppResult<CalendarRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => return CalendarRange::custom(start, end),
            (None, None) => {}
            _ => {
                return Err(AppError::InvalidInput(
                    "start and end must be given together".to_string(),
                ))
            }
        }

        let date = self.date.unwrap_or_else(|| Utc::now().date_naive());
        match self.view.unwrap_or(CalendarView::Week) {
            CalendarView::Week => CalendarRange::week(date),
            CalendarView::Month => CalendarRange::month(date),
            CalendarView::Range => Err(AppError::InvalidInput(
                "view=range requires start and end".to_string(),
            )),
        }
    }
}

pub async fn calendar(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<CalendarResponse>> {
    let range = query.range()?;
    let (prev, next) = (range.prev()?, range.next()?);
    let episodes = episodes::upcoming_episodes(&state, user.id(), range.start, range.end).await?;

    Ok(Json(CalendarResponse {
        range,
        prev,
        next,
        episodes,
    }))
}
