use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{WatchlistEntry, WatchlistEntryWithMovie},
    services::movies::get_movie,
    state::AppState,
};

pub async fn add(state: &AppState, user_id: Uuid, movie_id: Uuid) -> AppResult<WatchlistEntry> {
    get_movie(state, movie_id).await?;
    let entry = state.store.add_to_watchlist(user_id, movie_id).await?;
    tracing::info!(user_id = %user_id, movie_id = %movie_id, "Added to watchlist");
    Ok(entry)
}

pub async fn remove(state: &AppState, user_id: Uuid, movie_id: Uuid) -> AppResult<()> {
    if !state.store.remove_from_watchlist(user_id, movie_id).await? {
        return Err(AppError::NotFound("Not on the watchlist".to_string()));
    }
    Ok(())
}

pub async fn contains(state: &AppState, user_id: Uuid, movie_id: Uuid) -> AppResult<bool> {
    Ok(state
        .store
        .get_watchlist_entry(user_id, movie_id)
        .await?
        .is_some())
}

pub async fn list(state: &AppState, user_id: Uuid) -> AppResult<Vec<WatchlistEntryWithMovie>> {
    let entries = state.store.watchlist_for_user(user_id).await?;
    let ids: Vec<Uuid> = entries.iter().map(|e| e.movie_id).collect();
    let movies: HashMap<Uuid, _> = state
        .store
        .movies_by_ids(&ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let movie = movies.get(&entry.movie_id)?.clone();
            Some(WatchlistEntryWithMovie { entry, movie })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{self, movie, profile};

    #[tokio::test]
    async fn test_watchlist_lifecycle() {
        let state = test_support::state();
        let user = profile(&state, "planner").await;
        let first = movie(&state, 1, "First").await;
        let second = movie(&state, 2, "Second").await;

        add(&state, user.id, first.id).await.unwrap();
        add(&state, user.id, second.id).await.unwrap();
        assert!(matches!(
            add(&state, user.id, first.id).await.unwrap_err(),
            AppError::Conflict(_)
        ));

        let titles: Vec<String> = list(&state, user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.movie.title)
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);

        remove(&state, user.id, first.id).await.unwrap();
        assert!(!contains(&state, user.id, first.id).await.unwrap());
        assert!(contains(&state, user.id, second.id).await.unwrap());
        assert!(matches!(
            remove(&state, user.id, first.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_unknown_movie() {
        let state = test_support::state();
        let user = profile(&state, "planner").await;
        assert!(matches!(
            add(&state, user.id, Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
