use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, ProfileUpdate, TitleDetails, MAX_SCORE},
    services::{movies::ensure_movie_exists, subscriptions::set_subscriptions},
    state::AppState,
};

pub const MIN_PROVIDERS: usize = 1;
pub const MIN_SERIES: usize = 3;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SelectedSeries {
    pub tmdb_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingRequest {
    pub provider_ids: Vec<Uuid>,
    pub series: Vec<SelectedSeries>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailedImport {
    pub tmdb_id: i64,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingSummary {
    pub imported: Vec<Movie>,
    pub failed: Vec<FailedImport>,
}

/// Imports one selected show and records the implied top score
async fn import_series(state: AppState, user_id: Uuid, tmdb_id: i64) -> AppResult<Movie> {
    let details = state.metadata.tv_details(tmdb_id).await?;
    let movie = ensure_movie_exists(&state, &TitleDetails::Tv(details)).await?;
    state
        .store
        .upsert_rating(user_id, movie.id, MAX_SCORE, None)
        .await?;
    Ok(movie)
}

/// Saves the chosen services, then imports the chosen shows in parallel.
/// Failed imports are reported in the summary and never block completion.
pub async fn complete_onboarding(
    state: &AppState,
    user_id: Uuid,
    request: OnboardingRequest,
) -> AppResult<OnboardingSummary> {
    let mut series: Vec<SelectedSeries> = Vec::with_capacity(request.series.len());
    for selected in request.series {
        if !series.iter().any(|s| s.tmdb_id == selected.tmdb_id) {
            series.push(selected);
        }
    }

    if request.provider_ids.len() < MIN_PROVIDERS {
        return Err(AppError::InvalidInput(format!(
            "Select at least {} streaming service",
            MIN_PROVIDERS
        )));
    }
    if series.len() < MIN_SERIES {
        return Err(AppError::InvalidInput(format!(
            "Select at least {} series",
            MIN_SERIES
        )));
    }

    if state.store.get_profile(user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Profile {} not found", user_id)));
    }

    set_subscriptions(state, user_id, &request.provider_ids).await?;

    tracing::info!(
        user_id = %user_id,
        series_count = series.len(),
        "Importing onboarding series"
    );

    let mut tasks = Vec::with_capacity(series.len());
    for selected in &series {
        let state = state.clone();
        let tmdb_id = selected.tmdb_id;
        tasks.push(tokio::spawn(import_series(state, user_id, tmdb_id)));
    }

    let mut imported = Vec::new();
    let mut failed = Vec::new();

    for (selected, task) in series.into_iter().zip(tasks) {
        let outcome = match task.await {
            Ok(result) => result,
            Err(e) => Err(AppError::Internal(e.to_string())),
        };

        match outcome {
            Ok(movie) => imported.push(movie),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    tmdb_id = selected.tmdb_id,
                    error = %e,
                    "Onboarding import failed"
                );
                failed.push(FailedImport {
                    tmdb_id: selected.tmdb_id,
                    name: selected.name,
                    reason: e.to_string(),
                });
            }
        }
    }

    state
        .store
        .update_profile(user_id, ProfileUpdate::onboarding_completed())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user_id)))?;

    tracing::info!(
        user_id = %user_id,
        imported = imported.len(),
        failed = failed.len(),
        "Onboarding completed"
    );

    Ok(OnboardingSummary { imported, failed })
}
