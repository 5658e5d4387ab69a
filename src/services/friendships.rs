use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{FriendView, Friendship, FriendshipStatus, NewNotification},
    state::AppState,
};

async fn load_friendship(state: &AppState, friendship_id: Uuid) -> AppResult<Friendship> {
    state
        .store
        .get_friendship(friendship_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Friend request not found".to_string()))
}

/// Loads a pending request that `user_id` is allowed to answer
async fn pending_for_addressee(
    state: &AppState,
    user_id: Uuid,
    friendship_id: Uuid,
) -> AppResult<Friendship> {
    let friendship = load_friendship(state, friendship_id).await?;
    if friendship.addressee_id != user_id {
        return Err(AppError::Forbidden(
            "Only the recipient can answer a friend request".to_string(),
        ));
    }
    if friendship.status != FriendshipStatus::Pending {
        return Err(no_longer_pending());
    }
    Ok(friendship)
}

fn no_longer_pending() -> AppError {
    AppError::Conflict("Friend request is no longer pending".to_string())
}

pub async fn send_request(
    state: &AppState,
    requester_id: Uuid,
    addressee_id: Uuid,
) -> AppResult<Friendship> {
    if requester_id == addressee_id {
        return Err(AppError::InvalidInput(
            "You cannot send a friend request to yourself".to_string(),
        ));
    }
    if state.store.get_profile(addressee_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Profile {} not found",
            addressee_id
        )));
    }
    if state
        .store
        .friendship_between(requester_id, addressee_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "A friendship or request already exists".to_string(),
        ));
    }

    let friendship = state
        .store
        .create_friendship(requester_id, addressee_id)
        .await?;
    state
        .store
        .create_notification(NewNotification::friend_request(
            addressee_id,
            friendship.id,
            requester_id,
        ))
        .await?;

    tracing::info!(
        friendship_id = %friendship.id,
        requester_id = %requester_id,
        addressee_id = %addressee_id,
        "Friend request sent"
    );

    Ok(friendship)
}

pub async fn accept_request(
    state: &AppState,
    user_id: Uuid,
    friendship_id: Uuid,
) -> AppResult<Friendship> {
    let pending = pending_for_addressee(state, user_id, friendship_id).await?;
    let friendship = state
        .store
        .resolve_friend_request(friendship_id, FriendshipStatus::Accepted)
        .await?
        .ok_or_else(no_longer_pending)?;

    state
        .store
        .create_notification(NewNotification::friend_accepted(
            pending.requester_id,
            friendship_id,
        ))
        .await?;

    tracing::info!(friendship_id = %friendship_id, user_id = %user_id, "Friend request accepted");
    Ok(friendship)
}

pub async fn reject_request(
    state: &AppState,
    user_id: Uuid,
    friendship_id: Uuid,
) -> AppResult<Friendship> {
    pending_for_addressee(state, user_id, friendship_id).await?;
    let friendship = state
        .store
        .resolve_friend_request(friendship_id, FriendshipStatus::Rejected)
        .await?
        .ok_or_else(no_longer_pending)?;

    tracing::info!(friendship_id = %friendship_id, user_id = %user_id, "Friend request rejected");
    Ok(friendship)
}

/// Either party may remove a friendship or withdraw a request
pub async fn remove_friendship(
    state: &AppState,
    user_id: Uuid,
    friendship_id: Uuid,
) -> AppResult<()> {
    let friendship = load_friendship(state, friendship_id).await?;
    if !friendship.involves(user_id) {
        return Err(AppError::Forbidden(
            "Not a party to this friendship".to_string(),
        ));
    }

    state.store.delete_friendship(friendship_id).await?;
    tracing::info!(friendship_id = %friendship_id, user_id = %user_id, "Friendship removed");
    Ok(())
}

/// Ids of everyone the user has an accepted friendship with
pub async fn friend_ids(state: &AppState, user_id: Uuid) -> AppResult<Vec<Uuid>> {
    let accepted = state
        .store
        .friendships_for_user(user_id, FriendshipStatus::Accepted)
        .await?;
    Ok(accepted.iter().map(|f| f.other_party(user_id)).collect())
}

async fn with_profiles(
    state: &AppState,
    user_id: Uuid,
    friendships: Vec<Friendship>,
) -> AppResult<Vec<FriendView>> {
    let other_ids: Vec<Uuid> = friendships.iter().map(|f| f.other_party(user_id)).collect();
    let profiles: HashMap<Uuid, _> = state
        .store
        .profiles_by_ids(&other_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(friendships
        .into_iter()
        .filter_map(|f| {
            let profile = profiles.get(&f.other_party(user_id))?.clone();
            Some(FriendView {
                friendship_id: f.id,
                status: f.status,
                profile,
            })
        })
        .collect())
}

pub async fn list_friends(state: &AppState, user_id: Uuid) -> AppResult<Vec<FriendView>> {
    let accepted = state
        .store
        .friendships_for_user(user_id, FriendshipStatus::Accepted)
        .await?;
    with_profiles(state, user_id, accepted).await
}

/// Pending requests addressed to the user, newest first
pub async fn incoming_requests(state: &AppState, user_id: Uuid) -> AppResult<Vec<FriendView>> {
    let incoming: Vec<Friendship> = state
        .store
        .friendships_for_user(user_id, FriendshipStatus::Pending)
        .await?
        .into_iter()
        .filter(|f| f.addressee_id == user_id)
        .collect();
    with_profiles(state, user_id, incoming).await
}

pub async fn friendship_status(
    state: &AppState,
    user_id: Uuid,
    other_id: Uuid,
) -> AppResult<Option<Friendship>> {
    state.store.friendship_between(user_id, other_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;
    use crate::services::test_support::{self, profile};

    #[tokio::test]
    async fn test_request_accept_flow_notifies_both_sides() {
        let state = test_support::state();
        let alice = profile(&state, "alice").await;
        let bob = profile(&state, "bob").await;

        let request = send_request(&state, alice.id, bob.id).await.unwrap();
        assert_eq!(request.status, FriendshipStatus::Pending);

        let bob_inbox = state.store.notifications_for_user(bob.id, 50).await.unwrap();
        assert_eq!(bob_inbox.len(), 1);
        assert_eq!(bob_inbox[0].kind, NotificationType::FriendRequest);
        assert_eq!(bob_inbox[0].data["requester_id"], alice.id.to_string());

        let incoming = incoming_requests(&state, bob.id).await.unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].profile.username, "alice");
        assert!(incoming_requests(&state, alice.id).await.unwrap().is_empty());

        let accepted = accept_request(&state, bob.id, request.id).await.unwrap();
        assert_eq!(accepted.status, FriendshipStatus::Accepted);

        let alice_inbox = state.store.notifications_for_user(alice.id, 50).await.unwrap();
        assert_eq!(alice_inbox[0].kind, NotificationType::FriendAccepted);

        assert_eq!(friend_ids(&state, alice.id).await.unwrap(), vec![bob.id]);
        assert_eq!(friend_ids(&state, bob.id).await.unwrap(), vec![alice.id]);
        assert_eq!(
            list_friends(&state, alice.id).await.unwrap()[0].profile.id,
            bob.id
        );
    }

    #[tokio::test]
    async fn test_request_validation() {
        let state = test_support::state();
        let alice = profile(&state, "alice").await;
        let bob = profile(&state, "bob").await;

        assert!(matches!(
            send_request(&state, alice.id, alice.id).await.unwrap_err(),
            AppError::InvalidInput(_)
        ));
        assert!(matches!(
            send_request(&state, alice.id, Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));

        send_request(&state, alice.id, bob.id).await.unwrap();
        // Either direction counts as existing
        assert!(matches!(
            send_request(&state, bob.id, alice.id).await.unwrap_err(),
            AppError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_only_addressee_answers_pending_requests() {
        let state = test_support::state();
        let alice = profile(&state, "alice").await;
        let bob = profile(&state, "bob").await;
        let request = send_request(&state, alice.id, bob.id).await.unwrap();

        assert!(matches!(
            accept_request(&state, alice.id, request.id).await.unwrap_err(),
            AppError::Forbidden(_)
        ));

        let rejected = reject_request(&state, bob.id, request.id).await.unwrap();
        assert_eq!(rejected.status, FriendshipStatus::Rejected);
        assert!(matches!(
            accept_request(&state, bob.id, request.id).await.unwrap_err(),
            AppError::Conflict(_)
        ));
        assert!(friend_ids(&state, bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_accepts_notify_once() {
        let state = test_support::state();
        let alice = profile(&state, "alice").await;
        let bob = profile(&state, "bob").await;
        let request = send_request(&state, alice.id, bob.id).await.unwrap();

        let (first, second) = tokio::join!(
            accept_request(&state, bob.id, request.id),
            accept_request(&state, bob.id, request.id)
        );
        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::Conflict(_)))));

        let accepted_notices = state
            .store
            .notifications_for_user(alice.id, 50)
            .await
            .unwrap()
            .into_iter()
            .filter(|n| n.kind == NotificationType::FriendAccepted)
            .count();
        assert_eq!(accepted_notices, 1);
    }

    #[tokio::test]
    async fn test_resolving_twice_finds_nothing_pending() {
        let state = test_support::state();
        let alice = profile(&state, "alice").await;
        let bob = profile(&state, "bob").await;
        let request = send_request(&state, alice.id, bob.id).await.unwrap();

        let accepted = state
            .store
            .resolve_friend_request(request.id, FriendshipStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(accepted.map(|f| f.status), Some(FriendshipStatus::Accepted));

        let again = state
            .store
            .resolve_friend_request(request.id, FriendshipStatus::Rejected)
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(
            friendship_status(&state, alice.id, bob.id)
                .await
                .unwrap()
                .map(|f| f.status),
            Some(FriendshipStatus::Accepted)
        );
    }

    #[tokio::test]
    async fn test_either_party_can_remove() {
        let state = test_support::state();
        let alice = profile(&state, "alice").await;
        let bob = profile(&state, "bob").await;
        let carol = profile(&state, "carol").await;
        let request = send_request(&state, alice.id, bob.id).await.unwrap();
        accept_request(&state, bob.id, request.id).await.unwrap();

        assert!(matches!(
            remove_friendship(&state, carol.id, request.id).await.unwrap_err(),
            AppError::Forbidden(_)
        ));

        remove_friendship(&state, bob.id, request.id).await.unwrap();
        assert!(friendship_status(&state, alice.id, bob.id)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            remove_friendship(&state, alice.id, request.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
