use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
pub enum NotificationType {
    FriendRequest,
    FriendAccepted,
    NewEpisode,
    NewRating,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub body: Option<String>,
    pub data: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationType,
    pub title: String,
    pub body: Option<String>,
    pub data: serde_json::Value,
}

impl NewNotification {
    pub fn friend_request(addressee_id: Uuid, friendship_id: Uuid, requester_id: Uuid) -> Self {
        Self {
            user_id: addressee_id,
            kind: NotificationType::FriendRequest,
            title: "New friend request".to_string(),
            body: Some("Someone sent you a friend request".to_string()),
            data: json!({
                "friendship_id": friendship_id,
                "requester_id": requester_id,
            }),
        }
    }

    pub fn friend_accepted(requester_id: Uuid, friendship_id: Uuid) -> Self {
        Self {
            user_id: requester_id,
            kind: NotificationType::FriendAccepted,
            title: "Friend request accepted".to_string(),
            body: Some("Your friend request was accepted!".to_string()),
            data: json!({ "friendship_id": friendship_id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friend_request_payload() {
        let (addressee, friendship, requester) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let n = NewNotification::friend_request(addressee, friendship, requester);

        assert_eq!(n.user_id, addressee);
        assert_eq!(n.kind, NotificationType::FriendRequest);
        assert_eq!(n.data["friendship_id"], json!(friendship));
        assert_eq!(n.data["requester_id"], json!(requester));
    }

    #[test]
    fn test_notification_type_serialization() {
        assert_eq!(
            serde_json::to_string(&NotificationType::FriendAccepted).unwrap(),
            "\"friend_accepted\""
        );
        assert_eq!(
            serde_json::to_string(&NotificationType::NewEpisode).unwrap(),
            "\"new_episode\""
        );
    }
}
