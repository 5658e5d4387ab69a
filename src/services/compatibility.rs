use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Rating, MAX_SCORE, MIN_SCORE},
    state::AppState,
};

/// Largest possible gap between two scores
const MAX_DIFFERENCE: f64 = (MAX_SCORE - MIN_SCORE) as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Compatibility {
    /// 0-100; 100 means identical scores on every shared title
    pub score: i32,
    pub common_count: usize,
}

/// Taste match from the average score gap over titles both users rated
pub fn compatibility(ratings_a: &[Rating], ratings_b: &[Rating]) -> Compatibility {
    let scores_b: HashMap<_, _> = ratings_b.iter().map(|r| (r.movie_id, r.score)).collect();

    let diffs: Vec<i32> = ratings_a
        .iter()
        .filter_map(|a| scores_b.get(&a.movie_id).map(|b| (a.score - b).abs()))
        .collect();

    if diffs.is_empty() {
        return Compatibility {
            score: 0,
            common_count: 0,
        };
    }

    let avg = diffs.iter().sum::<i32>() as f64 / diffs.len() as f64;
    let score = ((MAX_DIFFERENCE - avg) / MAX_DIFFERENCE * 100.0).round() as i32;

    Compatibility {
        score,
        common_count: diffs.len(),
    }
}

pub async fn compatibility_between(
    state: &AppState,
    user_a: Uuid,
    user_b: Uuid,
) -> AppResult<Compatibility> {
    if state.store.get_profile(user_b).await?.is_none() {
        return Err(AppError::NotFound(format!("Profile {} not found", user_b)));
    }

    let ratings_a = state.store.ratings_for_user(user_a).await?;
    let ratings_b = state.store.ratings_for_user(user_b).await?;
    let result = compatibility(&ratings_a, &ratings_b);

    tracing::debug!(
        user_id = %user_a,
        other_id = %user_b,
        common_count = result.common_count,
        score = result.score,
        "Computed compatibility"
    );

    Ok(result)
}
