//! Room use-case service.
//!
//! # Responsibility
//! - Provide room CRUD and the listing read model to outer layers.
//! - Route membership changes through the participant repository so
//!   `joined_count` stays consistent.

use crate::model::participant::RoomParticipant;
use crate::model::room::{NewRoom, Room, RoomId, RoomListing, RoomUpdate};
use crate::model::topic::TopicId;
use crate::model::user::{UserId, UserPublic};
use crate::repo::participant_repo::ParticipantRepository;
use crate::repo::room_repo::RoomRepository;
use crate::repo::{ListQuery, RepoResult};

/// Use-case service for rooms and their participants.
pub struct RoomService<R: RoomRepository, P: ParticipantRepository> {
    rooms: R,
    participants: P,
}

impl<R: RoomRepository, P: ParticipantRepository> RoomService<R, P> {
    pub fn new(rooms: R, participants: P) -> Self {
        Self {
            rooms,
            participants,
        }
    }

    pub fn create_room(&self, room: &NewRoom) -> RepoResult<Room> {
        self.rooms.create_room(room)
    }

    pub fn get_room(&self, id: RoomId) -> RepoResult<Option<Room>> {
        self.rooms.get_room(id)
    }

    /// Room listing page with host and topic resolved.
    pub fn browse(&self, query: &ListQuery) -> RepoResult<Vec<RoomListing>> {
        self.rooms.list_room_listings(query)
    }

    pub fn get_listing(&self, id: RoomId) -> RepoResult<Option<RoomListing>> {
        self.rooms.get_room_listing(id)
    }

    pub fn list_rooms(&self, query: &ListQuery) -> RepoResult<Vec<Room>> {
        self.rooms.list_rooms(query)
    }

    pub fn update_room(&self, id: RoomId, update: &RoomUpdate) -> RepoResult<Room> {
        self.rooms.update_room(id, update)
    }

    /// Deletes a room with its messages and memberships.
    pub fn delete_room(&self, id: RoomId) -> RepoResult<()> {
        self.rooms.delete_room(id)
    }

    pub fn rooms_hosted_by(&self, user_id: UserId) -> RepoResult<Vec<Room>> {
        self.rooms.list_rooms_hosted_by(user_id)
    }

    pub fn rooms_for_topic(&self, topic_id: TopicId) -> RepoResult<Vec<Room>> {
        self.rooms.list_rooms_for_topic(topic_id)
    }

    pub fn join(&self, room_id: RoomId, user_id: UserId) -> RepoResult<RoomParticipant> {
        self.participants.join_room(room_id, user_id)
    }

    pub fn leave(&self, room_id: RoomId, user_id: UserId) -> RepoResult<()> {
        self.participants.leave_room(room_id, user_id)
    }

    pub fn participants(&self, room_id: RoomId) -> RepoResult<Vec<UserPublic>> {
        self.participants.list_participants(room_id)
    }

    pub fn joined_rooms(&self, user_id: UserId) -> RepoResult<Vec<Room>> {
        self.participants.list_joined_rooms(user_id)
    }

    pub fn is_participant(&self, room_id: RoomId, user_id: UserId) -> RepoResult<bool> {
        self.participants.is_participant(room_id, user_id)
    }
}
