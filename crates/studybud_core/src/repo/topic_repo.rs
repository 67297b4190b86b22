//! Topic repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting a topic never deletes rooms; their `topic_id` becomes `NULL`
//!   in the same statement (declared `ON DELETE SET NULL`).

use super::error::{RepoError, RepoResult};
use super::readiness::ensure_connection_ready;
use super::ListQuery;
use crate::model::topic::{NewTopic, Topic, TopicId, TopicUpdate};
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// Repository interface for topic CRUD operations.
pub trait TopicRepository {
    fn create_topic(&self, topic: &NewTopic) -> RepoResult<Topic>;
    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>>;
    fn list_topics(&self, query: &ListQuery) -> RepoResult<Vec<Topic>>;
    fn update_topic(&self, id: TopicId, update: &TopicUpdate) -> RepoResult<Topic>;
    fn delete_topic(&self, id: TopicId) -> RepoResult<()>;
}

/// SQLite-backed topic repository.
pub struct SqliteTopicRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTopicRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TopicRepository for SqliteTopicRepository<'_> {
    fn create_topic(&self, topic: &NewTopic) -> RepoResult<Topic> {
        topic.validate()?;

        self.conn.execute(
            "INSERT INTO base_topic (name) VALUES (?1);",
            [topic.name.as_str()],
        )?;

        Ok(Topic {
            id: self.conn.last_insert_rowid(),
            name: topic.name.clone(),
        })
    }

    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM base_topic WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_topic_row(row)?));
        }
        Ok(None)
    }

    fn list_topics(&self, query: &ListQuery) -> RepoResult<Vec<Topic>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name FROM base_topic ORDER BY id ASC LIMIT ?1 OFFSET ?2;",
        )?;
        let mut rows = stmt.query(params![
            i64::from(query.normalized_limit()),
            i64::from(query.offset)
        ])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        Ok(topics)
    }

    fn update_topic(&self, id: TopicId, update: &TopicUpdate) -> RepoResult<Topic> {
        update.validate()?;

        if let Some(name) = update.name.as_deref() {
            let changed = self.conn.execute(
                "UPDATE base_topic SET name = ?2 WHERE id = ?1;",
                params![id, name],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound { entity: "topic", id });
            }
        }

        self.get_topic(id)?
            .ok_or(RepoError::NotFound { entity: "topic", id })
    }

    fn delete_topic(&self, id: TopicId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let rooms_cleared: i64 = tx.query_row(
            "SELECT COUNT(*) FROM base_room WHERE topic_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        let changed = tx.execute("DELETE FROM base_topic WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "topic", id });
        }
        tx.commit()?;

        info!(
            "event=topic_delete module=repo status=ok topic_id={} rooms_cleared={}",
            id, rooms_cleared
        );
        Ok(())
    }
}

fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    Ok(Topic {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}
