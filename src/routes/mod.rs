use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware, require_user},
    state::AppState,
};

pub mod calendar;
pub mod follows;
pub mod friends;
pub mod movies;
pub mod notifications;
pub mod onboarding;
pub mod profiles;
pub mod providers;
pub mod ratings;
pub mod users;
pub mod watchlist;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes(state))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // Outside the trace layer so the span sees the request id
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1; every one needs a caller identity
fn api_routes(state: AppState) -> Router {
    Router::new()
        // Profiles
        .route("/profiles", post(profiles::create_profile))
        .route("/profiles/search", get(profiles::search))
        .route("/profiles/available", get(profiles::username_available))
        .route("/me", get(profiles::get_me).patch(profiles::update_me))
        .route("/users/:id", get(profiles::get_profile))
        .route("/users/:id/ratings", get(ratings::user_ratings))
        .route("/users/:id/compatibility", get(users::compatibility))
        .route("/users/:id/friendship", get(users::friendship))
        // Streaming providers
        .route("/providers", get(providers::list_providers))
        .route(
            "/me/subscriptions",
            get(providers::get_subscriptions).put(providers::set_subscriptions),
        )
        .route("/me/watchable", get(providers::watchable))
        .route("/onboarding", post(onboarding::complete))
        // Titles
        .route("/search", get(movies::search))
        .route("/tmdb/:media_type/:id", get(movies::tmdb_details))
        .route("/tmdb/:media_type/:id/import", post(movies::import))
        .route("/movies/:id", get(movies::get_movie))
        .route("/movies/:id/ratings", get(movies::movie_ratings))
        .route("/movies/:id/providers/sync", post(movies::sync_providers))
        .route("/movies/:id/episodes", get(movies::list_episodes))
        .route("/movies/:id/episodes/sync", post(movies::sync_episodes))
        .route("/calendar", get(calendar::calendar))
        // Follows, ratings and the watchlist
        .route("/me/follows", get(follows::list))
        .route(
            "/me/follows/:movie_id",
            get(follows::status)
                .put(follows::follow)
                .delete(follows::unfollow),
        )
        .route(
            "/me/ratings/:movie_id",
            get(ratings::get_rating)
                .put(ratings::rate)
                .delete(ratings::delete_rating),
        )
        .route("/feed", get(ratings::feed))
        .route("/me/watchlist", get(watchlist::list))
        .route(
            "/me/watchlist/:movie_id",
            get(watchlist::contains)
                .put(watchlist::add)
                .delete(watchlist::remove),
        )
        // Friends
        .route("/friends", get(friends::list_friends))
        .route(
            "/friends/requests",
            get(friends::incoming_requests).post(friends::send_request),
        )
        .route("/friends/requests/:id/accept", post(friends::accept))
        .route("/friends/requests/:id/reject", post(friends::reject))
        .route("/friends/:id", delete(friends::remove))
        // Notifications
        .route("/notifications", get(notifications::list))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/:id/read", put(notifications::mark_read))
        .route_layer(middleware::from_fn(require_user))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use crate::{
        middleware::{REQUEST_ID_HEADER, USER_ID_HEADER},
        services::test_support,
    };

    #[tokio::test]
    async fn test_health_is_public() {
        let app = create_router(test_support::state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_api_rejects_anonymous_callers() {
        let app = create_router(test_support::state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/feed")
                    .header(REQUEST_ID_HEADER, "anon-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "anon-1");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = create_router(test_support::state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/nope")
                    .header(USER_ID_HEADER, uuid::Uuid::new_v4().to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
