//! Field validation errors raised before any SQL runs.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// A value failed the declared type/length rules of its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text exceeds the declared maximum length (in characters).
    TooLong {
        entity: &'static str,
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Field is not part of the entity declaration.
    UnknownField {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLong {
                entity,
                field,
                max,
                actual,
            } => write!(
                f,
                "{entity}.{field} is {actual} characters long; at most {max} allowed"
            ),
            Self::UnknownField { entity, field } => {
                write!(f, "{entity} has no field `{field}`")
            }
        }
    }
}

impl Error for ValidationError {}
