//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `base_user`.
//! - Keep the denormalized `base_room.joined_count` correct when a
//!   participating user is deleted.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - Every write runs in one immediate transaction; a failure leaves no
//!   partial effect.
//! - Deleting a user removes their messages and memberships (cascade) and
//!   clears `host_id` on rooms they host (set-null).

use super::error::{RepoError, RepoResult};
use super::readiness::ensure_connection_ready;
use super::sql::{bool_to_int, optional_text, text, SetClause};
use super::ListQuery;
use crate::model::user::{NewUser, User, UserId, UserUpdate};
use log::info;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    name,
    password,
    bio,
    avatar,
    is_active,
    is_staff,
    is_superuser,
    date_joined,
    last_login
FROM base_user";

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn list_users(&self, query: &ListQuery) -> RepoResult<Vec<User>>;
    /// Applies only the fields set in `update` and returns the stored row.
    fn update_user(&self, id: UserId, update: &UserUpdate) -> RepoResult<User>;
    /// Stamps `last_login` with the given epoch milliseconds.
    fn record_login(&self, id: UserId, at_ms: i64) -> RepoResult<()>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        user.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO base_user (
                username,
                email,
                name,
                password,
                bio,
                avatar,
                is_active,
                is_staff,
                is_superuser
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                user.username.as_str(),
                user.email.as_deref(),
                user.name.as_deref(),
                user.password.as_str(),
                user.bio.as_deref(),
                user.avatar.as_deref(),
                bool_to_int(user.is_active),
                bool_to_int(user.is_staff),
                bool_to_int(user.is_superuser),
            ],
        )?;
        let id = tx.last_insert_rowid();
        let created = load_user(&tx, id)?;
        tx.commit()?;

        Ok(created)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        find_user(self.conn, id)
    }

    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;
        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_users(&self, query: &ListQuery) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![
            i64::from(query.normalized_limit()),
            i64::from(query.offset)
        ])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn update_user(&self, id: UserId, update: &UserUpdate) -> RepoResult<User> {
        update.validate()?;

        let mut clause = SetClause::new();
        if let Some(username) = update.username.as_deref() {
            clause.set("username", text(username));
        }
        if let Some(email) = update.email.as_ref() {
            clause.set("email", optional_text(email.as_deref()));
        }
        if let Some(name) = update.name.as_ref() {
            clause.set("name", optional_text(name.as_deref()));
        }
        if let Some(password) = update.password.as_deref() {
            clause.set("password", text(password));
        }
        if let Some(bio) = update.bio.as_ref() {
            clause.set("bio", optional_text(bio.as_deref()));
        }
        if let Some(avatar) = update.avatar.as_ref() {
            clause.set("avatar", optional_text(avatar.as_deref()));
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !clause.is_empty() {
            let (sql, values) = clause.into_update("base_user", id);
            let changed = tx.execute(&sql, params_from_iter(values))?;
            if changed == 0 {
                return Err(RepoError::NotFound { entity: "user", id });
            }
        }
        let updated = load_user(&tx, id)?;
        tx.commit()?;

        Ok(updated)
    }

    fn record_login(&self, id: UserId, at_ms: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE base_user SET last_login = ?2 WHERE id = ?1;",
            params![id, at_ms],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        load_user(&tx, id)?;

        let rooms_left = tx.execute(
            "UPDATE base_room
             SET joined_count = MAX(joined_count - 1, 0)
             WHERE id IN (
                SELECT room_id FROM base_room_participants WHERE user_id = ?1
             );",
            [id],
        )?;
        let messages_removed: i64 = tx.query_row(
            "SELECT COUNT(*) FROM base_message WHERE user_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        let rooms_orphaned: i64 = tx.query_row(
            "SELECT COUNT(*) FROM base_room WHERE host_id = ?1;",
            [id],
            |row| row.get(0),
        )?;

        tx.execute("DELETE FROM base_user WHERE id = ?1;", [id])?;
        tx.commit()?;

        info!(
            "event=user_delete module=repo status=ok user_id={} messages_removed={} rooms_left={} rooms_unhosted={}",
            id, messages_removed, rooms_left, rooms_orphaned
        );
        Ok(())
    }
}

fn find_user(conn: &Connection, id: UserId) -> RepoResult<Option<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_user_row(row)?));
    }
    Ok(None)
}

fn load_user(conn: &Connection, id: UserId) -> RepoResult<User> {
    find_user(conn, id)?.ok_or(RepoError::NotFound { entity: "user", id })
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        name: row.get("name")?,
        password: row.get("password")?,
        bio: row.get("bio")?,
        avatar: row.get("avatar")?,
        is_active: parse_flag(row, "is_active")?,
        is_staff: parse_flag(row, "is_staff")?,
        is_superuser: parse_flag(row, "is_superuser")?,
        date_joined: row.get("date_joined")?,
        last_login: row.get("last_login")?,
    })
}

fn parse_flag(row: &Row<'_>, column: &'static str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}` in base_user.{column}"
        ))),
    }
}
