//! Message domain model.

use super::room::RoomId;
use super::user::UserId;
use serde::Serialize;

pub type MessageId = i64;

/// Chat message posted by a user into a room.
///
/// Removed together with its author or its room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub user_id: UserId,
    pub room_id: RoomId,
    pub body: String,
    pub created: i64,
    pub updated: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub body: String,
}

impl NewMessage {
    pub fn new(user_id: UserId, room_id: RoomId, body: impl Into<String>) -> Self {
        Self {
            user_id,
            room_id,
            body: body.into(),
        }
    }
}

/// Partial update for a message body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageUpdate {
    pub body: Option<String>,
}

impl MessageUpdate {
    pub fn is_empty(&self) -> bool {
        self.body.is_none()
    }
}
