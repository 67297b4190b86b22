//! Room domain model.
//!
//! # Responsibility
//! - Define the stored room record, create input and partial update.
//! - Define the listing read model with nested host and topic.
//!
//! # Invariants
//! - `host_id` and `topic_id` are optional; a room outlives its host and topic.
//! - `joined_count` is a denormalized counter maintained by the participant
//!   repository, not by the schema.

use super::schema::ROOM;
use super::topic::{Topic, TopicId};
use super::user::{UserId, UserPublic};
use super::validation::ValidationError;
use serde::Serialize;

pub type RoomId = i64;

/// Stored room record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub host_id: Option<UserId>,
    pub topic_id: Option<TopicId>,
    pub name: String,
    pub description: Option<String>,
    pub joined_count: i64,
    /// Unix epoch milliseconds, UTC.
    pub created: i64,
    /// Unix epoch milliseconds, UTC. Set on every update.
    pub updated: Option<i64>,
}

/// Room as presented in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomListing {
    pub id: RoomId,
    pub name: String,
    pub description: Option<String>,
    pub joined_count: i64,
    pub host: Option<UserPublic>,
    pub topic: Option<Topic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub name: String,
    pub description: Option<String>,
    pub host_id: Option<UserId>,
    pub topic_id: Option<TopicId>,
}

impl NewRoom {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            host_id: None,
            topic_id: None,
        }
    }

    pub fn hosted_by(mut self, host_id: UserId) -> Self {
        self.host_id = Some(host_id);
        self
    }

    pub fn with_topic(mut self, topic_id: TopicId) -> Self {
        self.topic_id = Some(topic_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ROOM.check_text("name", &self.name)
    }
}

/// Partial update for a room.
///
/// `None` leaves a field untouched; `Some(None)` clears a nullable column.
/// `joined_count` is deliberately absent: only membership changes move it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub host_id: Option<Option<UserId>>,
    pub topic_id: Option<Option<TopicId>>,
}

impl RoomUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.host_id.is_none()
            && self.topic_id.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.name.as_deref() {
            Some(name) => ROOM.check_text("name", name),
            None => Ok(()),
        }
    }
}
