//! StudyBud domain model.
//!
//! # Responsibility
//! - Define entity records, create inputs, partial updates and read models.
//! - Declare the schema catalogue those records are stored under.
//!
//! # Invariants
//! - Every entity is identified by an integer surrogate key.
//! - Deletion is a hard delete; dependents follow the declared on-delete rules.
//! - Relations are resolved by explicit queries, never by object back-pointers.

pub mod message;
pub mod participant;
pub mod room;
pub mod schema;
pub mod topic;
pub mod user;
pub mod validation;
