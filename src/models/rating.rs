use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Movie, Profile};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

/// A user's 1-5 score for a title, unique per (user, movie)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub score: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingWithMovie {
    #[serde(flatten)]
    pub rating: Rating,
    pub movie: Movie,
}

/// One entry of the friend-activity feed
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub rating: Rating,
    pub profile: Profile,
    pub movie: Movie,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingWithProfile {
    #[serde(flatten)]
    pub rating: Rating,
    pub profile: Profile,
}
