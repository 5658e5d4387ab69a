use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::StreamingProvider,
    state::AppState,
};

/// Which titles a user can actually watch on their subscriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchFilter {
    /// No subscriptions, or the "All" sentinel: everything passes
    Unfiltered,
    Only(HashSet<Uuid>),
}

impl WatchFilter {
    pub fn allows(&self, movie_id: Uuid) -> bool {
        match self {
            WatchFilter::Unfiltered => true,
            WatchFilter::Only(ids) => ids.contains(&movie_id),
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, WatchFilter::Only(_))
    }
}

impl From<Option<Vec<Uuid>>> for WatchFilter {
    fn from(ids: Option<Vec<Uuid>>) -> Self {
        match ids {
            None => WatchFilter::Unfiltered,
            Some(ids) => WatchFilter::Only(ids.into_iter().collect()),
        }
    }
}

pub async fn list_providers(state: &AppState) -> AppResult<Vec<StreamingProvider>> {
    state.store.list_providers().await
}

pub async fn subscribed_providers(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<Vec<StreamingProvider>> {
    state.store.subscribed_providers(user_id).await
}

pub async fn subscribed_provider_ids(state: &AppState, user_id: Uuid) -> AppResult<Vec<Uuid>> {
    let providers = state.store.subscribed_providers(user_id).await?;
    Ok(providers.into_iter().map(|p| p.id).collect())
}

/// Replaces the user's whole subscription set; an empty list clears it
pub async fn set_subscriptions(
    state: &AppState,
    user_id: Uuid,
    provider_ids: &[Uuid],
) -> AppResult<Vec<StreamingProvider>> {
    let mut unique: Vec<Uuid> = Vec::with_capacity(provider_ids.len());
    for id in provider_ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }

    let known = state.store.providers_by_ids(&unique).await?;
    if known.len() != unique.len() {
        let missing: Vec<String> = unique
            .iter()
            .filter(|id| !known.iter().any(|p| p.id == **id))
            .map(Uuid::to_string)
            .collect();
        return Err(AppError::InvalidInput(format!(
            "Unknown streaming providers: {}",
            missing.join(", ")
        )));
    }

    state.store.replace_subscriptions(user_id, &unique).await?;
    tracing::info!(
        user_id = %user_id,
        provider_count = unique.len(),
        "Subscriptions updated"
    );

    state.store.subscribed_providers(user_id).await
}

/// `None` means no filtering applies; otherwise the titles on any
/// subscribed provider, which may be empty
pub async fn filtered_movie_ids(state: &AppState, user_id: Uuid) -> AppResult<Option<Vec<Uuid>>> {
    let providers = state.store.subscribed_providers(user_id).await?;

    if providers.is_empty() || providers.iter().any(StreamingProvider::is_all) {
        return Ok(None);
    }

    let provider_ids: Vec<Uuid> = providers.iter().map(|p| p.id).collect();
    let mut movie_ids = state.store.movie_ids_for_providers(&provider_ids).await?;
    movie_ids.sort();
    movie_ids.dedup();

    Ok(Some(movie_ids))
}

pub async fn watch_filter(state: &AppState, user_id: Uuid) -> AppResult<WatchFilter> {
    filtered_movie_ids(state, user_id).await.map(WatchFilter::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::metadata::MockMetadataProvider;
    use crate::services::test_support::{self, movie, profile, provider};

    #[tokio::test]
    async fn test_no_subscriptions_means_no_filter() {
        let state = test_support::state();
        let user = profile(&state, "nosubs").await;

        assert_eq!(filtered_movie_ids(&state, user.id).await.unwrap(), None);
        assert!(watch_filter(&state, user.id)
            .await
            .unwrap()
            .allows(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn test_all_sentinel_disables_filter() {
        let state = test_support::seeded_state_with(MockMetadataProvider::new()).await;
        let user = profile(&state, "everything").await;
        let netflix = provider(&state, 8, "Netflix").await;
        let all = state
            .store
            .list_providers()
            .await
            .unwrap()
            .into_iter()
            .find(StreamingProvider::is_all)
            .unwrap();

        set_subscriptions(&state, user.id, &[netflix.id, all.id])
            .await
            .unwrap();

        assert_eq!(filtered_movie_ids(&state, user.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_filter_is_union_of_subscribed_providers() {
        let state = test_support::state();
        let user = profile(&state, "picky").await;
        let netflix = provider(&state, 8, "Netflix").await;
        let hulu = provider(&state, 15, "Hulu").await;
        let max = provider(&state, 1899, "Max").await;

        let on_both = movie(&state, 1, "On Both").await;
        let on_hulu = movie(&state, 2, "Hulu Only").await;
        let on_max = movie(&state, 3, "Max Only").await;
        state
            .store
            .replace_movie_providers(on_both.id, &[netflix.id, hulu.id])
            .await
            .unwrap();
        state
            .store
            .replace_movie_providers(on_hulu.id, &[hulu.id])
            .await
            .unwrap();
        state
            .store
            .replace_movie_providers(on_max.id, &[max.id])
            .await
            .unwrap();

        set_subscriptions(&state, user.id, &[netflix.id, hulu.id])
            .await
            .unwrap();

        let mut ids = filtered_movie_ids(&state, user.id).await.unwrap().unwrap();
        ids.sort();
        let mut expected = vec![on_both.id, on_hulu.id];
        expected.sort();
        assert_eq!(ids, expected);

        let filter = watch_filter(&state, user.id).await.unwrap();
        assert!(filter.is_filtered());
        assert!(!filter.allows(on_max.id));
    }

    #[tokio::test]
    async fn test_subscribed_to_provider_without_titles_filters_everything() {
        let state = test_support::state();
        let user = profile(&state, "empty").await;
        let mubi = provider(&state, 11, "MUBI").await;

        set_subscriptions(&state, user.id, &[mubi.id]).await.unwrap();

        assert_eq!(
            filtered_movie_ids(&state, user.id).await.unwrap(),
            Some(vec![])
        );
    }

    #[tokio::test]
    async fn test_set_subscriptions_replaces_and_dedupes() {
        let state = test_support::state();
        let user = profile(&state, "switcher").await;
        let netflix = provider(&state, 8, "Netflix").await;
        let hulu = provider(&state, 15, "Hulu").await;

        set_subscriptions(&state, user.id, &[netflix.id, netflix.id])
            .await
            .unwrap();
        assert_eq!(
            subscribed_provider_ids(&state, user.id).await.unwrap(),
            vec![netflix.id]
        );

        let current = set_subscriptions(&state, user.id, &[hulu.id]).await.unwrap();
        assert_eq!(current, vec![hulu.clone()]);

        set_subscriptions(&state, user.id, &[]).await.unwrap();
        assert!(subscribed_providers(&state, user.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let state = test_support::state();
        let user = profile(&state, "typo").await;
        let netflix = provider(&state, 8, "Netflix").await;

        set_subscriptions(&state, user.id, &[netflix.id]).await.unwrap();
        let err = set_subscriptions(&state, user.id, &[netflix.id, Uuid::new_v4()])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(
            subscribed_provider_ids(&state, user.id).await.unwrap(),
            vec![netflix.id]
        );
    }

    #[tokio::test]
    async fn test_subscribing_needs_a_profile() {
        let state = test_support::state();
        let netflix = provider(&state, 8, "Netflix").await;
        let anonymous = Uuid::new_v4();

        let err = set_subscriptions(&state, anonymous, &[netflix.id])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(subscribed_provider_ids(&state, anonymous)
            .await
            .unwrap()
            .is_empty());
    }
}
