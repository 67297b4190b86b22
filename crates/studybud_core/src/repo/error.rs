//! Repository error taxonomy.
//!
//! # Responsibility
//! - Give every repository one semantic error type.
//! - Classify SQLite constraint failures into integrity errors callers can
//!   act on (`ConstraintViolation`, `Reference`).
//!
//! # Invariants
//! - Foreign key failures (dangling reference on write, or a delete blocked
//!   by a restricting reference) always surface as `Reference`.
//! - Any other `SQLITE_CONSTRAINT*` failure surfaces as `ConstraintViolation`.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::{ffi, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Which storage constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    NotNull,
    PrimaryKey,
    Check,
    Other,
}

impl ConstraintKind {
    fn from_extended_code(code: i32) -> Self {
        match code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => Self::Unique,
            ffi::SQLITE_CONSTRAINT_NOTNULL => Self::NotNull,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Self::PrimaryKey,
            ffi::SQLITE_CONSTRAINT_CHECK => Self::Check,
            _ => Self::Other,
        }
    }
}

impl Display for ConstraintKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Unique => "unique",
            Self::NotNull => "not_null",
            Self::PrimaryKey => "primary_key",
            Self::Check => "check",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Error returned by every repository operation.
#[derive(Debug)]
pub enum RepoError {
    /// Input failed field validation; nothing was written.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Identifier does not resolve to a row.
    NotFound { entity: &'static str, id: i64 },
    /// The user is not a participant of the room.
    NotParticipant { room_id: i64, user_id: i64 },
    /// Uniqueness, required-field, key or check constraint rejected the write.
    ConstraintViolation {
        kind: ConstraintKind,
        message: String,
    },
    /// Foreign key points at a missing row, or a delete is blocked by one.
    Reference { message: String },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Live schema disagrees with the declared catalogue.
    SchemaMismatch { table: &'static str, detail: String },
}

impl RepoError {
    /// Whether this error is a uniqueness violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation {
                kind: ConstraintKind::Unique | ConstraintKind::PrimaryKey,
                ..
            }
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::NotParticipant { room_id, user_id } => {
                write!(f, "user {user_id} is not a participant of room {room_id}")
            }
            Self::ConstraintViolation { kind, message } => {
                write!(f, "constraint violation ({kind}): {message}")
            }
            Self::Reference { message } => write!(f, "reference error: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::SchemaMismatch { table, detail } => {
                write!(f, "schema mismatch in `{table}`: {detail}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            if failure.code == ErrorCode::ConstraintViolation {
                let message = message.clone().unwrap_or_else(|| failure.to_string());
                if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                    return Self::Reference { message };
                }
                return Self::ConstraintViolation {
                    kind: ConstraintKind::from_extended_code(failure.extended_code),
                    message,
                };
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}
