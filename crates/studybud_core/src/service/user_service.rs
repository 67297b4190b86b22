//! User use-case service.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Outward reads go through `UserPublic`; the stored password stays inside.

use crate::model::user::{NewUser, User, UserId, UserPublic, UserUpdate};
use crate::repo::user_repo::UserRepository;
use crate::repo::{ListQuery, RepoResult};

/// Use-case service wrapper for user operations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a user and returns the stored record.
    pub fn register(&self, user: &NewUser) -> RepoResult<User> {
        self.repo.create_user(user)
    }

    pub fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(id)
    }

    /// Public profile by id, `None` when the user does not exist.
    pub fn get_profile(&self, id: UserId) -> RepoResult<Option<UserPublic>> {
        Ok(self.repo.get_user(id)?.map(|user| user.to_public()))
    }

    pub fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.repo.get_user_by_username(username)
    }

    /// Public profiles ordered by id.
    pub fn list_profiles(&self, query: &ListQuery) -> RepoResult<Vec<UserPublic>> {
        Ok(self
            .repo
            .list_users(query)?
            .iter()
            .map(User::to_public)
            .collect())
    }

    pub fn update_user(&self, id: UserId, update: &UserUpdate) -> RepoResult<User> {
        self.repo.update_user(id, update)
    }

    pub fn record_login(&self, id: UserId, at_ms: i64) -> RepoResult<()> {
        self.repo.record_login(id, at_ms)
    }

    /// Deletes a user with their messages and memberships.
    pub fn delete_user(&self, id: UserId) -> RepoResult<()> {
        self.repo.delete_user(id)
    }
}
