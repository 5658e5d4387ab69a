use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Follow, FollowWithMovie},
    services::{episodes::sync_episodes, movies::get_movie},
    state::AppState,
};

/// Starts tracking a show. The episode sync that follows is best effort:
/// a metadata outage must not undo the follow.
pub async fn follow(state: &AppState, user_id: Uuid, movie_id: Uuid) -> AppResult<Follow> {
    let movie = get_movie(state, movie_id).await?;
    if !movie.is_tv() {
        return Err(AppError::InvalidInput(
            "Only TV shows can be followed".to_string(),
        ));
    }

    let follow = state.store.create_follow(user_id, movie_id).await?;
    tracing::info!(user_id = %user_id, movie_id = %movie_id, "Show followed");

    if let Err(e) = sync_episodes(state, movie_id).await {
        tracing::warn!(error = %e, movie_id = %movie_id, "Episode sync after follow failed");
    }

    Ok(follow)
}

pub async fn unfollow(state: &AppState, user_id: Uuid, movie_id: Uuid) -> AppResult<()> {
    if !state.store.delete_follow(user_id, movie_id).await? {
        return Err(AppError::NotFound("Not following this show".to_string()));
    }
    tracing::info!(user_id = %user_id, movie_id = %movie_id, "Show unfollowed");
    Ok(())
}

pub async fn is_following(state: &AppState, user_id: Uuid, movie_id: Uuid) -> AppResult<bool> {
    Ok(state.store.get_follow(user_id, movie_id).await?.is_some())
}

/// Followed shows, newest follow first
pub async fn followed_shows(state: &AppState, user_id: Uuid) -> AppResult<Vec<FollowWithMovie>> {
    let follows = state.store.follows_for_user(user_id).await?;
    let movie_ids: Vec<Uuid> = follows.iter().map(|f| f.movie_id).collect();
    let movies: HashMap<Uuid, _> = state
        .store
        .movies_by_ids(&movie_ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    Ok(follows
        .into_iter()
        .filter_map(|follow| {
            let movie = movies.get(&follow.movie_id)?.clone();
            Some(FollowWithMovie { follow, movie })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::metadata::MockMetadataProvider;
    use crate::services::test_support::{self, movie, profile, season, show};

    #[tokio::test]
    async fn test_follow_syncs_episodes() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_season_details()
            .times(1)
            .returning(|_, n| Ok(season(n, &["2025-01-01"])));
        let state = test_support::state_with(metadata);
        let user = profile(&state, "fan").await;
        let s = show(&state, 100, "Severance").await;

        follow(&state, user.id, s.id).await.unwrap();

        assert!(is_following(&state, user.id, s.id).await.unwrap());
        assert_eq!(state.store.episodes_for_show(s.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_follow_survives_sync_failure() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_season_details()
            .returning(|_, _| Err(AppError::ExternalApi("timeout".to_string())));
        let state = test_support::state_with(metadata);
        let user = profile(&state, "patient").await;
        let s = show(&state, 101, "Andor").await;

        follow(&state, user.id, s.id).await.unwrap();
        assert!(is_following(&state, user.id, s.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_rules() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_season_details()
            .returning(|_, n| Ok(season(n, &[])));
        let state = test_support::state_with(metadata);
        let user = profile(&state, "strict").await;
        let film = movie(&state, 550, "Fight Club").await;
        let s = show(&state, 102, "Shogun").await;

        let err = follow(&state, user.id, film.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        follow(&state, user.id, s.id).await.unwrap();
        let err = follow(&state, user.id, s.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = follow(&state, user.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_and_unfollow() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_season_details()
            .returning(|_, n| Ok(season(n, &[])));
        let state = test_support::state_with(metadata);
        let user = profile(&state, "lister").await;
        let first = show(&state, 1, "First").await;
        let second = show(&state, 2, "Second").await;

        follow(&state, user.id, first.id).await.unwrap();
        follow(&state, user.id, second.id).await.unwrap();

        let titles: Vec<String> = followed_shows(&state, user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.movie.title)
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);

        unfollow(&state, user.id, first.id).await.unwrap();
        assert!(!is_following(&state, user.id, first.id).await.unwrap());
        assert!(matches!(
            unfollow(&state, user.id, first.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
