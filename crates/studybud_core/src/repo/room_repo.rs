//! Room repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `base_room`.
//! - Provide the listing read model joining host and topic.
//! - Answer host/topic back-reference queries explicitly.
//!
//! # Invariants
//! - `joined_count` is never written here; membership changes own it.
//! - Deleting a room removes its messages and memberships in the same
//!   statement (declared `ON DELETE CASCADE`).
//! - A dangling `host_id`/`topic_id` on write surfaces as `RepoError::Reference`.

use super::error::{RepoError, RepoResult};
use super::readiness::ensure_connection_ready;
use super::sql::{optional_integer, optional_text, text, SetClause, NOW_MS_SQL};
use super::ListQuery;
use crate::model::room::{NewRoom, Room, RoomId, RoomListing, RoomUpdate};
use crate::model::topic::{Topic, TopicId};
use crate::model::user::{UserId, UserPublic};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const ROOM_SELECT_SQL: &str = "SELECT
    id,
    host_id,
    topic_id,
    name,
    description,
    joined_count,
    created,
    updated
FROM base_room";

const ROOM_LISTING_SELECT_SQL: &str = "SELECT
    r.id AS id,
    r.name AS name,
    r.description AS description,
    r.joined_count AS joined_count,
    h.id AS host_id,
    h.username AS host_username,
    h.email AS host_email,
    h.name AS host_name,
    h.bio AS host_bio,
    h.date_joined AS host_date_joined,
    h.last_login AS host_last_login,
    t.id AS topic_id,
    t.name AS topic_name
FROM base_room r
LEFT JOIN base_user h ON h.id = r.host_id
LEFT JOIN base_topic t ON t.id = r.topic_id";

/// Repository interface for room operations.
pub trait RoomRepository {
    fn create_room(&self, room: &NewRoom) -> RepoResult<Room>;
    fn get_room(&self, id: RoomId) -> RepoResult<Option<Room>>;
    fn list_rooms(&self, query: &ListQuery) -> RepoResult<Vec<Room>>;
    /// Rooms with their host (public view) and topic resolved.
    fn list_room_listings(&self, query: &ListQuery) -> RepoResult<Vec<RoomListing>>;
    fn get_room_listing(&self, id: RoomId) -> RepoResult<Option<RoomListing>>;
    /// Applies only the fields set in `update`, stamps `updated`.
    fn update_room(&self, id: RoomId, update: &RoomUpdate) -> RepoResult<Room>;
    fn delete_room(&self, id: RoomId) -> RepoResult<()>;
    fn list_rooms_hosted_by(&self, user_id: UserId) -> RepoResult<Vec<Room>>;
    fn list_rooms_for_topic(&self, topic_id: TopicId) -> RepoResult<Vec<Room>>;
}

/// SQLite-backed room repository.
pub struct SqliteRoomRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoomRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RoomRepository for SqliteRoomRepository<'_> {
    fn create_room(&self, room: &NewRoom) -> RepoResult<Room> {
        room.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO base_room (
                host_id,
                topic_id,
                name,
                description
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                room.host_id,
                room.topic_id,
                room.name.as_str(),
                room.description.as_deref(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        let created = load_room(&tx, id)?;
        tx.commit()?;

        Ok(created)
    }

    fn get_room(&self, id: RoomId) -> RepoResult<Option<Room>> {
        find_room(self.conn, id)
    }

    fn list_rooms(&self, query: &ListQuery) -> RepoResult<Vec<Room>> {
        query_rooms(
            self.conn,
            &format!("{ROOM_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"),
            vec![
                Value::Integer(i64::from(query.normalized_limit())),
                Value::Integer(i64::from(query.offset)),
            ],
        )
    }

    fn list_room_listings(&self, query: &ListQuery) -> RepoResult<Vec<RoomListing>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ROOM_LISTING_SELECT_SQL} ORDER BY r.id ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![
            i64::from(query.normalized_limit()),
            i64::from(query.offset)
        ])?;
        let mut listings = Vec::new();
        while let Some(row) = rows.next()? {
            listings.push(parse_listing_row(row)?);
        }
        Ok(listings)
    }

    fn get_room_listing(&self, id: RoomId) -> RepoResult<Option<RoomListing>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ROOM_LISTING_SELECT_SQL} WHERE r.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_listing_row(row)?));
        }
        Ok(None)
    }

    fn update_room(&self, id: RoomId, update: &RoomUpdate) -> RepoResult<Room> {
        update.validate()?;

        let mut clause = SetClause::new();
        if let Some(name) = update.name.as_deref() {
            clause.set("name", text(name));
        }
        if let Some(description) = update.description.as_ref() {
            clause.set("description", optional_text(description.as_deref()));
        }
        if let Some(host_id) = update.host_id {
            clause.set("host_id", optional_integer(host_id));
        }
        if let Some(topic_id) = update.topic_id {
            clause.set("topic_id", optional_integer(topic_id));
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !clause.is_empty() {
            clause.set_expr("updated", NOW_MS_SQL);
            let (sql, values) = clause.into_update("base_room", id);
            let changed = tx.execute(&sql, params_from_iter(values))?;
            if changed == 0 {
                return Err(RepoError::NotFound { entity: "room", id });
            }
        }
        let updated = load_room(&tx, id)?;
        tx.commit()?;

        Ok(updated)
    }

    fn delete_room(&self, id: RoomId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let messages_removed: i64 = tx.query_row(
            "SELECT COUNT(*) FROM base_message WHERE room_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        let changed = tx.execute("DELETE FROM base_room WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "room", id });
        }
        tx.commit()?;

        info!(
            "event=room_delete module=repo status=ok room_id={} messages_removed={}",
            id, messages_removed
        );
        Ok(())
    }

    fn list_rooms_hosted_by(&self, user_id: UserId) -> RepoResult<Vec<Room>> {
        query_rooms(
            self.conn,
            &format!("{ROOM_SELECT_SQL} WHERE host_id = ?1 ORDER BY id ASC;"),
            vec![Value::Integer(user_id)],
        )
    }

    fn list_rooms_for_topic(&self, topic_id: TopicId) -> RepoResult<Vec<Room>> {
        query_rooms(
            self.conn,
            &format!("{ROOM_SELECT_SQL} WHERE topic_id = ?1 ORDER BY id ASC;"),
            vec![Value::Integer(topic_id)],
        )
    }
}

fn find_room(conn: &Connection, id: RoomId) -> RepoResult<Option<Room>> {
    let mut rooms = query_rooms(
        conn,
        &format!("{ROOM_SELECT_SQL} WHERE id = ?1;"),
        vec![Value::Integer(id)],
    )?;
    Ok(rooms.pop())
}

fn load_room(conn: &Connection, id: RoomId) -> RepoResult<Room> {
    find_room(conn, id)?.ok_or(RepoError::NotFound { entity: "room", id })
}

pub(crate) fn query_rooms(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<Room>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut rooms = Vec::new();
    while let Some(row) = rows.next()? {
        rooms.push(parse_room_row(row)?);
    }
    Ok(rooms)
}

fn parse_room_row(row: &Row<'_>) -> RepoResult<Room> {
    Ok(Room {
        id: row.get("id")?,
        host_id: row.get("host_id")?,
        topic_id: row.get("topic_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        joined_count: row.get("joined_count")?,
        created: row.get("created")?,
        updated: row.get("updated")?,
    })
}

fn parse_listing_row(row: &Row<'_>) -> RepoResult<RoomListing> {
    let id: RoomId = row.get("id")?;

    let host = match row.get::<_, Option<UserId>>("host_id")? {
        Some(host_id) => {
            let username: Option<String> = row.get("host_username")?;
            let date_joined: Option<i64> = row.get("host_date_joined")?;
            let (Some(username), Some(date_joined)) = (username, date_joined) else {
                return Err(RepoError::InvalidData(format!(
                    "incomplete host {host_id} joined for room {id}"
                )));
            };
            Some(UserPublic {
                id: host_id,
                username,
                email: row.get("host_email")?,
                name: row.get("host_name")?,
                bio: row.get("host_bio")?,
                date_joined,
                last_login: row.get("host_last_login")?,
            })
        }
        None => None,
    };

    let topic = match row.get::<_, Option<TopicId>>("topic_id")? {
        Some(topic_id) => {
            let name: Option<String> = row.get("topic_name")?;
            let Some(name) = name else {
                return Err(RepoError::InvalidData(format!(
                    "incomplete topic {topic_id} joined for room {id}"
                )));
            };
            Some(Topic { id: topic_id, name })
        }
        None => None,
    };

    Ok(RoomListing {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        joined_count: row.get("joined_count")?,
        host,
        topic,
    })
}
