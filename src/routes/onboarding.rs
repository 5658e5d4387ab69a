use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    services::onboarding::{self, OnboardingRequest, OnboardingSummary},
    state::AppState,
};

pub async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<OnboardingRequest>,
) -> AppResult<Json<OnboardingSummary>> {
    Ok(Json(
        onboarding::complete_onboarding(&state, user.id(), request).await?,
    ))
}
