use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{validate_username, NewProfile, Profile, ProfileUpdate},
    state::AppState,
};

const SEARCH_LIMIT: i64 = 20;

pub async fn create_profile(state: &AppState, profile: NewProfile) -> AppResult<Profile> {
    validate_username(&profile.username)?;
    if !username_available(state, &profile.username).await? {
        return Err(AppError::Conflict(format!(
            "Username {} is taken",
            profile.username
        )));
    }

    let display_name = profile
        .display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let created = state
        .store
        .create_profile(NewProfile {
            display_name,
            ..profile
        })
        .await?;

    tracing::info!(user_id = %created.id, username = %created.username, "Profile created");
    Ok(created)
}

pub async fn get_profile(state: &AppState, user_id: Uuid) -> AppResult<Profile> {
    state
        .store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user_id)))
}

pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    update: ProfileUpdate,
) -> AppResult<Profile> {
    if let Some(username) = &update.username {
        validate_username(username)?;
        if let Some(holder) = state.store.find_profile_by_username(username).await? {
            if holder.id != user_id {
                return Err(AppError::Conflict(format!("Username {} is taken", username)));
            }
        }
    }

    state
        .store
        .update_profile(user_id, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user_id)))
}

/// Case-insensitive; malformed usernames are never available
pub async fn username_available(state: &AppState, username: &str) -> AppResult<bool> {
    if validate_username(username).is_err() {
        return Ok(false);
    }
    Ok(state
        .store
        .find_profile_by_username(username)
        .await?
        .is_none())
}

pub async fn search_profiles(
    state: &AppState,
    user_id: Uuid,
    query: &str,
) -> AppResult<Vec<Profile>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(vec![]);
    }
    state
        .store
        .search_profiles(query, user_id, SEARCH_LIMIT)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;

    fn new_profile(username: &str) -> NewProfile {
        NewProfile {
            id: Uuid::new_v4(),
            username: username.to_string(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_display_name() {
        let state = test_support::state();
        let created = create_profile(&state, new_profile("film_buff")).await.unwrap();
        assert_eq!(created.display_name.as_deref(), Some("film_buff"));
        assert!(!created.onboarding_completed);
    }

    #[tokio::test]
    async fn test_usernames_are_unique_ignoring_case() {
        let state = test_support::state();
        create_profile(&state, new_profile("Neo")).await.unwrap();

        assert!(!username_available(&state, "neo").await.unwrap());
        assert!(!username_available(&state, "x").await.unwrap());
        assert!(username_available(&state, "trinity").await.unwrap());
        assert!(matches!(
            create_profile(&state, new_profile("NEO")).await.unwrap_err(),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            create_profile(&state, new_profile("bad name")).await.unwrap_err(),
            AppError::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let state = test_support::state();
        let neo = create_profile(&state, new_profile("neo")).await.unwrap();
        create_profile(&state, new_profile("smith")).await.unwrap();

        let updated = update_profile(
            &state,
            neo.id,
            ProfileUpdate {
                bio: Some("The One".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("The One"));
        assert_eq!(updated.username, "neo");
        assert!(updated.updated_at >= neo.updated_at);

        let taken = ProfileUpdate {
            username: Some("Smith".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(matches!(
            update_profile(&state, neo.id, taken).await.unwrap_err(),
            AppError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_search_excludes_caller() {
        let state = test_support::state();
        let me = create_profile(&state, new_profile("anna_k")).await.unwrap();
        create_profile(
            &state,
            NewProfile {
                display_name: Some("Anna Smith".to_string()),
                ..new_profile("asmith")
            },
        )
        .await
        .unwrap();
        create_profile(&state, new_profile("bob")).await.unwrap();

        let found = search_profiles(&state, me.id, "ANNA").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "asmith");
        assert!(search_profiles(&state, me.id, "  ").await.unwrap().is_empty());
    }
}
