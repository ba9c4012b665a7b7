use serde::{Deserialize, Serialize};

use super::UserProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friend {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub fullname: Option<String>,
    pub avatar: Option<String>,
    pub online: Option<bool>,
}

/// A pending friend request, accepted via its `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: Option<i64>,
    pub from: Option<UserProfile>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<i64>,
    pub sender_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub content: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
    pub read: Option<bool>,
    pub created_at: Option<String>,
}
