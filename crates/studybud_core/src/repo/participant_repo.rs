//! Room membership repository.
//!
//! # Responsibility
//! - Link and unlink users and rooms through `base_room_participants`.
//! - Own the denormalized `base_room.joined_count` counter.
//!
//! # Invariants
//! - A (room, user) pair is linked at most once; a second join fails with a
//!   primary-key `ConstraintViolation` and leaves the counter untouched.
//! - The link row and the counter change in the same immediate transaction.
//! - `joined_count` never drops below zero.

use super::error::{RepoError, RepoResult};
use super::readiness::ensure_connection_ready;
use super::room_repo::query_rooms;
use crate::model::participant::RoomParticipant;
use crate::model::room::{Room, RoomId};
use crate::model::user::{UserId, UserPublic};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const JOINED_ROOMS_SQL: &str = "SELECT
    r.id AS id,
    r.host_id AS host_id,
    r.topic_id AS topic_id,
    r.name AS name,
    r.description AS description,
    r.joined_count AS joined_count,
    r.created AS created,
    r.updated AS updated
FROM base_room r
JOIN base_room_participants p ON p.room_id = r.id
WHERE p.user_id = ?1
ORDER BY r.id ASC;";

/// Repository interface for room membership.
pub trait ParticipantRepository {
    /// Links `user_id` to `room_id` and bumps the room's `joined_count`.
    fn join_room(&self, room_id: RoomId, user_id: UserId) -> RepoResult<RoomParticipant>;
    /// Removes the link and decrements `joined_count`.
    ///
    /// Fails with `RepoError::NotFound` when the room or user does not exist,
    /// and with `RepoError::NotParticipant` when both exist but are not linked.
    fn leave_room(&self, room_id: RoomId, user_id: UserId) -> RepoResult<()>;
    fn list_participants(&self, room_id: RoomId) -> RepoResult<Vec<UserPublic>>;
    fn list_joined_rooms(&self, user_id: UserId) -> RepoResult<Vec<Room>>;
    fn is_participant(&self, room_id: RoomId, user_id: UserId) -> RepoResult<bool>;
}

/// SQLite-backed membership repository.
pub struct SqliteParticipantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParticipantRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParticipantRepository for SqliteParticipantRepository<'_> {
    fn join_room(&self, room_id: RoomId, user_id: UserId) -> RepoResult<RoomParticipant> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO base_room_participants (room_id, user_id) VALUES (?1, ?2);",
            params![room_id, user_id],
        )?;
        tx.execute(
            "UPDATE base_room SET joined_count = joined_count + 1 WHERE id = ?1;",
            [room_id],
        )?;
        tx.commit()?;

        debug!(
            "event=room_join module=repo status=ok room_id={} user_id={}",
            room_id, user_id
        );
        Ok(RoomParticipant { room_id, user_id })
    }

    fn leave_room(&self, room_id: RoomId, user_id: UserId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed = tx.execute(
            "DELETE FROM base_room_participants WHERE room_id = ?1 AND user_id = ?2;",
            params![room_id, user_id],
        )?;
        if removed == 0 {
            if !row_exists(&tx, "base_room", room_id)? {
                return Err(RepoError::NotFound {
                    entity: "room",
                    id: room_id,
                });
            }
            if !row_exists(&tx, "base_user", user_id)? {
                return Err(RepoError::NotFound {
                    entity: "user",
                    id: user_id,
                });
            }
            return Err(RepoError::NotParticipant { room_id, user_id });
        }
        tx.execute(
            "UPDATE base_room SET joined_count = MAX(joined_count - 1, 0) WHERE id = ?1;",
            [room_id],
        )?;
        tx.commit()?;

        debug!(
            "event=room_leave module=repo status=ok room_id={} user_id={}",
            room_id, user_id
        );
        Ok(())
    }

    fn list_participants(&self, room_id: RoomId) -> RepoResult<Vec<UserPublic>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                u.id AS id,
                u.username AS username,
                u.email AS email,
                u.name AS name,
                u.bio AS bio,
                u.date_joined AS date_joined,
                u.last_login AS last_login
             FROM base_user u
             JOIN base_room_participants p ON p.user_id = u.id
             WHERE p.room_id = ?1
             ORDER BY u.id ASC;",
        )?;
        let mut rows = stmt.query([room_id])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_public_user_row(row)?);
        }
        Ok(users)
    }

    fn list_joined_rooms(&self, user_id: UserId) -> RepoResult<Vec<Room>> {
        query_rooms(self.conn, JOINED_ROOMS_SQL, vec![Value::Integer(user_id)])
    }

    fn is_participant(&self, room_id: RoomId, user_id: UserId) -> RepoResult<bool> {
        let linked: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM base_room_participants WHERE room_id = ?1 AND user_id = ?2
             );",
            params![room_id, user_id],
            |row| row.get(0),
        )?;
        Ok(linked == 1)
    }
}

fn row_exists(conn: &Connection, table: &'static str, id: i64) -> RepoResult<bool> {
    let found: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(found == 1)
}

fn parse_public_user_row(row: &Row<'_>) -> RepoResult<UserPublic> {
    Ok(UserPublic {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        name: row.get("name")?,
        bio: row.get("bio")?,
        date_joined: row.get("date_joined")?,
        last_login: row.get("last_login")?,
    })
}
