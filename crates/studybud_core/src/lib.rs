//! Core data model and relational integrity layer for StudyBud.
//! This crate is the single source of truth for entity and reference rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig, StoreLocation};
pub use db::{open_db, open_db_in_memory, open_store, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::message::{Message, MessageId, MessageUpdate, NewMessage};
pub use model::participant::RoomParticipant;
pub use model::room::{NewRoom, Room, RoomId, RoomListing, RoomUpdate};
pub use model::topic::{NewTopic, Topic, TopicId, TopicUpdate};
pub use model::user::{NewUser, User, UserId, UserPublic, UserUpdate};
pub use model::validation::ValidationError;
pub use repo::message_repo::{MessageRepository, SqliteMessageRepository};
pub use repo::participant_repo::{ParticipantRepository, SqliteParticipantRepository};
pub use repo::room_repo::{RoomRepository, SqliteRoomRepository};
pub use repo::topic_repo::{SqliteTopicRepository, TopicRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{verify_schema, ConstraintKind, ListQuery, RepoError, RepoResult};
pub use service::message_service::MessageService;
pub use service::room_service::RoomService;
pub use service::topic_service::TopicService;
pub use service::user_service::UserService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
