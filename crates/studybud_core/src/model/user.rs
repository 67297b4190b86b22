//! User domain model.
//!
//! # Responsibility
//! - Define the stored user record, its create input and partial update.
//! - Provide the public projection handed to outer layers.
//!
//! # Invariants
//! - `UserPublic` never carries `password`.
//! - `UserUpdate` only touches fields explicitly set by the caller.

use super::schema::USER;
use super::validation::ValidationError;
use serde::Serialize;

/// Surrogate key of a user row.
pub type UserId = i64;

/// Avatar assigned when a user does not pick one.
pub const DEFAULT_AVATAR: &str = "avatar.svg";

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Opaque credential string; never interpreted by core.
    pub password: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    /// Unix epoch milliseconds, UTC.
    pub date_joined: i64,
    /// Unix epoch milliseconds, UTC.
    pub last_login: Option<i64>,
}

impl User {
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            bio: self.bio.clone(),
            date_joined: self.date_joined,
            last_login: self.last_login,
        }
    }
}

/// Outward-facing user view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPublic {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub date_joined: i64,
    pub last_login: Option<i64>,
}

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    /// Creates input with schema defaults for every optional field.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            name: None,
            password: password.into(),
            bio: None,
            avatar: Some(DEFAULT_AVATAR.to_string()),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        USER.check_text("username", &self.username)?;
        USER.check_optional_text("email", self.email.as_deref())?;
        USER.check_optional_text("name", self.name.as_deref())?;
        Ok(())
    }
}

/// Partial update for a user.
///
/// `None` leaves a field untouched. For nullable columns, `Some(None)` clears
/// the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<Option<String>>,
    pub name: Option<Option<String>>,
    pub password: Option<String>,
    pub bio: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.name.is_none()
            && self.password.is_none()
            && self.bio.is_none()
            && self.avatar.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(username) = self.username.as_deref() {
            USER.check_text("username", username)?;
        }
        if let Some(email) = self.email.as_ref() {
            USER.check_optional_text("email", email.as_deref())?;
        }
        if let Some(name) = self.name.as_ref() {
            USER.check_optional_text("name", name.as_deref())?;
        }
        Ok(())
    }
}
