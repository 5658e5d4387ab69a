use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{NewProfile, Profile, ProfileUpdate},
    services::profiles,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub username: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct UsernameAvailability {
    pub username: String,
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Creates the caller's profile; the id comes from the gateway identity
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateProfileRequest>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    let profile = profiles::create_profile(
        &state,
        NewProfile {
            id: user.id(),
            username: body.username,
            display_name: body.display_name,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Profile>> {
    Ok(Json(profiles::get_profile(&state, user.id()).await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<Profile>> {
    Ok(Json(profiles::update_profile(&state, user.id(), update).await?))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Profile>> {
    Ok(Json(profiles::get_profile(&state, user_id).await?))
}

pub async fn username_available(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<UsernameAvailability>> {
    let available = profiles::username_available(&state, &query.username).await?;
    Ok(Json(UsernameAvailability {
        username: query.username,
        available,
    }))
}

pub async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Profile>>> {
    Ok(Json(
        profiles::search_profiles(&state, user.id(), &query.q).await?,
    ))
}
