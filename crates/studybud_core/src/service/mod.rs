//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep outer layers (HTTP, CLI) decoupled from storage details.

pub mod message_service;
pub mod room_service;
pub mod topic_service;
pub mod user_service;
