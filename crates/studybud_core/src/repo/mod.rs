//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts, one per entity.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate input before persistence.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `ConstraintViolation`, `Reference`) in addition to DB transport errors.

pub mod error;
pub mod message_repo;
pub mod participant_repo;
pub mod readiness;
pub mod room_repo;
mod sql;
pub mod topic_repo;
pub mod user_repo;

pub use error::{ConstraintKind, RepoError, RepoResult};
pub use readiness::{ensure_connection_ready, verify_schema};

const LIST_DEFAULT_LIMIT: u32 = 100;
const LIST_LIMIT_MAX: u32 = 100;

/// Offset/limit window for list operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Maximum rows to return. Defaults to 100 and clamps to 100.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

impl ListQuery {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    pub fn normalized_limit(&self) -> u32 {
        normalize_list_limit(self.limit)
    }
}

/// Normalizes list limit according to the listing contract.
pub fn normalize_list_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => LIST_DEFAULT_LIMIT,
        Some(value) if value > LIST_LIMIT_MAX => LIST_LIMIT_MAX,
        Some(value) => value,
        None => LIST_DEFAULT_LIMIT,
    }
}
