//! Message use-case service.

use crate::model::message::{Message, MessageId, MessageUpdate, NewMessage};
use crate::model::room::RoomId;
use crate::model::user::UserId;
use crate::repo::message_repo::MessageRepository;
use crate::repo::RepoResult;

pub struct MessageService<R: MessageRepository> {
    repo: R,
}

impl<R: MessageRepository> MessageService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Posts `body` into `room_id` as `user_id`.
    ///
    /// Fails with `RepoError::Reference` when either id does not exist.
    pub fn post(
        &self,
        user_id: UserId,
        room_id: RoomId,
        body: impl Into<String>,
    ) -> RepoResult<Message> {
        self.repo
            .create_message(&NewMessage::new(user_id, room_id, body))
    }

    pub fn get_message(&self, id: MessageId) -> RepoResult<Option<Message>> {
        self.repo.get_message(id)
    }

    pub fn room_messages(&self, room_id: RoomId) -> RepoResult<Vec<Message>> {
        self.repo.list_messages_for_room(room_id)
    }

    pub fn user_messages(&self, user_id: UserId) -> RepoResult<Vec<Message>> {
        self.repo.list_messages_for_user(user_id)
    }

    pub fn edit(&self, id: MessageId, body: impl Into<String>) -> RepoResult<Message> {
        self.repo.update_message(
            id,
            &MessageUpdate {
                body: Some(body.into()),
            },
        )
    }

    pub fn delete_message(&self, id: MessageId) -> RepoResult<()> {
        self.repo.delete_message(id)
    }
}
