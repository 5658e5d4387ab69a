use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Notification,
    state::AppState,
};

const NOTIFICATION_LIMIT: i64 = 50;

pub async fn list_notifications(state: &AppState, user_id: Uuid) -> AppResult<Vec<Notification>> {
    state
        .store
        .notifications_for_user(user_id, NOTIFICATION_LIMIT)
        .await
}

pub async fn unread_count(state: &AppState, user_id: Uuid) -> AppResult<i64> {
    state.store.unread_count(user_id).await
}

pub async fn mark_read(state: &AppState, user_id: Uuid, notification_id: Uuid) -> AppResult<()> {
    if !state.store.mark_read(notification_id, user_id).await? {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }
    Ok(())
}

pub async fn mark_all_read(state: &AppState, user_id: Uuid) -> AppResult<u64> {
    let updated = state.store.mark_all_read(user_id).await?;
    tracing::debug!(user_id = %user_id, updated, "Notifications marked read");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewNotification;
    use crate::services::test_support::{self, profile};

    #[tokio::test]
    async fn test_read_state_is_scoped_to_owner() {
        let state = test_support::state();
        let owner = profile(&state, "owner").await;
        let other = profile(&state, "other").await;

        for _ in 0..2 {
            state
                .store
                .create_notification(NewNotification::friend_accepted(owner.id, Uuid::new_v4()))
                .await
                .unwrap();
        }
        let newest = list_notifications(&state, owner.id).await.unwrap()[0].clone();
        assert_eq!(unread_count(&state, owner.id).await.unwrap(), 2);

        assert!(matches!(
            mark_read(&state, other.id, newest.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        mark_read(&state, owner.id, newest.id).await.unwrap();
        assert_eq!(unread_count(&state, owner.id).await.unwrap(), 1);

        assert_eq!(mark_all_read(&state, owner.id).await.unwrap(), 1);
        assert_eq!(unread_count(&state, owner.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_is_capped() {
        let state = test_support::state();
        let user = profile(&state, "popular").await;
        for _ in 0..(NOTIFICATION_LIMIT + 5) {
            state
                .store
                .create_notification(NewNotification::friend_accepted(user.id, Uuid::new_v4()))
                .await
                .unwrap();
        }

        let listed = list_notifications(&state, user.id).await.unwrap();
        assert_eq!(listed.len() as i64, NOTIFICATION_LIMIT);
        assert_eq!(unread_count(&state, user.id).await.unwrap(), NOTIFICATION_LIMIT + 5);
    }
}
