//! Topic domain model.

use super::schema::TOPIC;
use super::validation::ValidationError;
use serde::Serialize;

pub type TopicId = i64;

/// Label grouping rooms by subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTopic {
    pub name: String,
}

impl NewTopic {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        TOPIC.check_text("name", &self.name)
    }
}

/// Partial update for a topic; `None` leaves the name unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicUpdate {
    pub name: Option<String>,
}

impl TopicUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.name.as_deref() {
            Some(name) => TOPIC.check_text("name", name),
            None => Ok(()),
        }
    }
}
