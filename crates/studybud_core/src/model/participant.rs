//! Room membership link.

use super::room::RoomId;
use super::user::UserId;
use serde::Serialize;

/// One user's membership in one room. The pair is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RoomParticipant {
    pub room_id: RoomId,
    pub user_id: UserId,
}
