use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::StreamingProvider,
    services::subscriptions,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SetSubscriptionsRequest {
    pub provider_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct WatchableResponse {
    /// False when every title counts as watchable
    pub filtered: bool,
    pub movie_ids: Vec<Uuid>,
}

pub async fn list_providers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StreamingProvider>>> {
    Ok(Json(subscriptions::list_providers(&state).await?))
}

pub async fn get_subscriptions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<StreamingProvider>>> {
    Ok(Json(
        subscriptions::subscribed_providers(&state, user.id()).await?,
    ))
}

pub async fn set_subscriptions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<SetSubscriptionsRequest>,
) -> AppResult<Json<Vec<StreamingProvider>>> {
    Ok(Json(
        subscriptions::set_subscriptions(&state, user.id(), &body.provider_ids).await?,
    ))
}

pub async fn watchable(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<WatchableResponse>> {
    let response = match subscriptions::filtered_movie_ids(&state, user.id()).await? {
        None => WatchableResponse {
            filtered: false,
            movie_ids: vec![],
        },
        Some(movie_ids) => WatchableResponse {
            filtered: true,
            movie_ids,
        },
    };
    Ok(Json(response))
}
