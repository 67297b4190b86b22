//! Message repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `user_id` and `room_id` must reference existing rows; otherwise the
//!   insert fails with `RepoError::Reference` and nothing is written.
//! - Messages disappear with their author or their room (cascade).

use super::error::{RepoError, RepoResult};
use super::readiness::ensure_connection_ready;
use super::sql::NOW_MS_SQL;
use crate::model::message::{Message, MessageId, MessageUpdate, NewMessage};
use crate::model::room::RoomId;
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const MESSAGE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    room_id,
    body,
    created,
    updated
FROM base_message";

/// Repository interface for message operations.
pub trait MessageRepository {
    fn create_message(&self, message: &NewMessage) -> RepoResult<Message>;
    fn get_message(&self, id: MessageId) -> RepoResult<Option<Message>>;
    /// Messages of one room, oldest first.
    fn list_messages_for_room(&self, room_id: RoomId) -> RepoResult<Vec<Message>>;
    /// Messages written by one user, oldest first.
    fn list_messages_for_user(&self, user_id: UserId) -> RepoResult<Vec<Message>>;
    fn update_message(&self, id: MessageId, update: &MessageUpdate) -> RepoResult<Message>;
    fn delete_message(&self, id: MessageId) -> RepoResult<()>;
}

/// SQLite-backed message repository.
pub struct SqliteMessageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMessageRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn list_where(&self, column: &'static str, id: i64) -> RepoResult<Vec<Message>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MESSAGE_SELECT_SQL} WHERE {column} = ?1 ORDER BY created ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([id])?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(parse_message_row(row)?);
        }
        Ok(messages)
    }
}

impl MessageRepository for SqliteMessageRepository<'_> {
    fn create_message(&self, message: &NewMessage) -> RepoResult<Message> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO base_message (user_id, room_id, body) VALUES (?1, ?2, ?3);",
            params![message.user_id, message.room_id, message.body.as_str()],
        )?;
        let id = tx.last_insert_rowid();
        let created = find_message(&tx, id)?.ok_or(RepoError::NotFound {
            entity: "message",
            id,
        })?;
        tx.commit()?;

        Ok(created)
    }

    fn get_message(&self, id: MessageId) -> RepoResult<Option<Message>> {
        find_message(self.conn, id)
    }

    fn list_messages_for_room(&self, room_id: RoomId) -> RepoResult<Vec<Message>> {
        self.list_where("room_id", room_id)
    }

    fn list_messages_for_user(&self, user_id: UserId) -> RepoResult<Vec<Message>> {
        self.list_where("user_id", user_id)
    }

    fn update_message(&self, id: MessageId, update: &MessageUpdate) -> RepoResult<Message> {
        if let Some(body) = update.body.as_deref() {
            let changed = self.conn.execute(
                &format!(
                    "UPDATE base_message SET body = ?2, updated = {NOW_MS_SQL} WHERE id = ?1;"
                ),
                params![id, body],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: "message",
                    id,
                });
            }
        }

        find_message(self.conn, id)?.ok_or(RepoError::NotFound {
            entity: "message",
            id,
        })
    }

    fn delete_message(&self, id: MessageId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM base_message WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "message",
                id,
            });
        }
        Ok(())
    }
}

fn find_message(conn: &Connection, id: MessageId) -> RepoResult<Option<Message>> {
    let mut stmt = conn.prepare(&format!("{MESSAGE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_message_row(row)?));
    }
    Ok(None)
}

fn parse_message_row(row: &Row<'_>) -> RepoResult<Message> {
    Ok(Message {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        room_id: row.get("room_id")?,
        body: row.get("body")?,
        created: row.get("created")?,
        updated: row.get("updated")?,
    })
}
