//! Declarative schema catalogue.
//!
//! # Responsibility
//! - Declare entity fields (type, nullability, defaults, constraints).
//! - Declare references between entities and their on-delete behavior.
//! - Declare many-to-many association entities.
//!
//! # Invariants
//! - The catalogue mirrors `db/migrations/0001_init.sql`; `repo::verify_schema`
//!   checks a live connection against it.
//! - A reference with no explicit on-delete behavior is `Restrict`.

use super::validation::ValidationError;

/// Primitive storage type of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Text,
    Boolean,
    /// Unix epoch milliseconds, UTC. Database defaults are taken from
    /// `strftime('%s', 'now')`, so stored values have whole-second
    /// resolution; rows written within one second share a timestamp.
    Timestamp,
}

/// Value a field takes when the caller does not provide one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Integer(i64),
    Boolean(bool),
    Text(&'static str),
    /// Computed at insert time.
    Now,
}

/// One column of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
    pub primary_key: bool,
    pub unique: bool,
    pub indexed: bool,
    /// Maximum length in characters, for text fields.
    pub max_length: Option<usize>,
}

impl FieldDef {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            nullable: false,
            default: None,
            primary_key: false,
            unique: false,
            indexed: false,
            max_length: None,
        }
    }

    /// Surrogate integer key named `id`.
    pub const fn id() -> Self {
        Self {
            primary_key: true,
            ..Self::new("id", FieldType::Integer)
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub const fn default_value(self, default: DefaultValue) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    pub const fn indexed(self) -> Self {
        Self {
            indexed: true,
            ..self
        }
    }

    pub const fn max_length(self, max: usize) -> Self {
        Self {
            max_length: Some(max),
            ..self
        }
    }
}

/// What happens to referencing rows when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnDelete {
    /// Delete the referencing rows too.
    Cascade,
    /// Clear the referencing column.
    SetNull,
    /// Reject the delete while referencing rows exist.
    #[default]
    Restrict,
}

impl OnDelete {
    /// SQL spelling used in `ON DELETE` clauses.
    pub fn sql_action(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
        }
    }

    /// Whether a `PRAGMA foreign_key_list` action satisfies this behavior.
    ///
    /// SQLite reports an undeclared action as `NO ACTION`, which rejects the
    /// delete at commit just like `RESTRICT`.
    pub fn matches_pragma_action(self, action: &str) -> bool {
        match self {
            Self::Restrict => action == "RESTRICT" || action == "NO ACTION",
            other => action == other.sql_action(),
        }
    }
}

/// Foreign key from one entity column to another entity's `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub column: &'static str,
    pub target_table: &'static str,
    pub target_column: &'static str,
    pub nullable: bool,
    pub on_delete: OnDelete,
}

impl Reference {
    pub const fn new(column: &'static str, target_table: &'static str) -> Self {
        Self {
            column,
            target_table,
            target_column: "id",
            nullable: false,
            on_delete: OnDelete::Restrict,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub const fn on_delete(self, on_delete: OnDelete) -> Self {
        Self { on_delete, ..self }
    }
}

/// Entity declaration: fields plus outgoing references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDef {
    pub name: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldDef],
    pub references: &'static [Reference],
}

impl EntityDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn reference(&self, column: &str) -> Option<&Reference> {
        self.references
            .iter()
            .find(|reference| reference.column == column)
    }

    /// Checks one text value against the declared field constraints.
    pub fn check_text(&self, field: &'static str, value: &str) -> Result<(), ValidationError> {
        let Some(def) = self.field(field) else {
            return Err(ValidationError::UnknownField {
                entity: self.name,
                field,
            });
        };

        if let Some(max) = def.max_length {
            let actual = value.chars().count();
            if actual > max {
                return Err(ValidationError::TooLong {
                    entity: self.name,
                    field,
                    max,
                    actual,
                });
            }
        }

        Ok(())
    }

    /// Like `check_text`, for nullable columns; `None` always passes.
    pub fn check_optional_text(
        &self,
        field: &'static str,
        value: Option<&str>,
    ) -> Result<(), ValidationError> {
        match value {
            Some(value) => self.check_text(field, value),
            None => Ok(()),
        }
    }
}

/// Many-to-many link entity keyed by its two references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationDef {
    pub name: &'static str,
    pub table: &'static str,
    pub left: Reference,
    pub right: Reference,
}

impl AssociationDef {
    /// Columns forming the composite primary key, in declaration order.
    pub fn key_columns(&self) -> [&'static str; 2] {
        [self.left.column, self.right.column]
    }
}

/// Full catalogue of entities and associations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDef {
    pub entities: &'static [EntityDef],
    pub associations: &'static [AssociationDef],
}

impl SchemaDef {
    pub fn table_names(&self) -> Vec<&'static str> {
        self.entities
            .iter()
            .map(|entity| entity.table)
            .chain(self.associations.iter().map(|association| association.table))
            .collect()
    }
}

pub const USER: EntityDef = EntityDef {
    name: "user",
    table: "base_user",
    fields: &[
        FieldDef::id(),
        FieldDef::new("username", FieldType::Text)
            .max_length(150)
            .unique()
            .indexed(),
        FieldDef::new("email", FieldType::Text)
            .nullable()
            .unique()
            .max_length(254),
        FieldDef::new("name", FieldType::Text)
            .nullable()
            .max_length(200),
        FieldDef::new("password", FieldType::Text),
        FieldDef::new("bio", FieldType::Text).nullable(),
        FieldDef::new("avatar", FieldType::Text)
            .nullable()
            .default_value(DefaultValue::Text("avatar.svg")),
        FieldDef::new("is_active", FieldType::Boolean).default_value(DefaultValue::Boolean(true)),
        FieldDef::new("is_staff", FieldType::Boolean).default_value(DefaultValue::Boolean(false)),
        FieldDef::new("is_superuser", FieldType::Boolean)
            .default_value(DefaultValue::Boolean(false)),
        FieldDef::new("date_joined", FieldType::Timestamp).default_value(DefaultValue::Now),
        FieldDef::new("last_login", FieldType::Timestamp).nullable(),
    ],
    references: &[],
};

pub const TOPIC: EntityDef = EntityDef {
    name: "topic",
    table: "base_topic",
    fields: &[
        FieldDef::id(),
        FieldDef::new("name", FieldType::Text).max_length(200),
    ],
    references: &[],
};

pub const ROOM: EntityDef = EntityDef {
    name: "room",
    table: "base_room",
    fields: &[
        FieldDef::id(),
        FieldDef::new("host_id", FieldType::Integer).nullable(),
        FieldDef::new("topic_id", FieldType::Integer).nullable(),
        FieldDef::new("name", FieldType::Text).max_length(200),
        FieldDef::new("description", FieldType::Text).nullable(),
        FieldDef::new("joined_count", FieldType::Integer).default_value(DefaultValue::Integer(0)),
        FieldDef::new("created", FieldType::Timestamp).default_value(DefaultValue::Now),
        FieldDef::new("updated", FieldType::Timestamp).nullable(),
    ],
    // host_id: the delete action for a removed host is an assumption (set-null),
    // chosen to match topic_id.
    references: &[
        Reference::new("host_id", "base_user")
            .nullable()
            .on_delete(OnDelete::SetNull),
        Reference::new("topic_id", "base_topic")
            .nullable()
            .on_delete(OnDelete::SetNull),
    ],
};

pub const MESSAGE: EntityDef = EntityDef {
    name: "message",
    table: "base_message",
    fields: &[
        FieldDef::id(),
        FieldDef::new("user_id", FieldType::Integer),
        FieldDef::new("room_id", FieldType::Integer),
        FieldDef::new("body", FieldType::Text),
        FieldDef::new("created", FieldType::Timestamp).default_value(DefaultValue::Now),
        FieldDef::new("updated", FieldType::Timestamp).nullable(),
    ],
    references: &[
        Reference::new("user_id", "base_user").on_delete(OnDelete::Cascade),
        Reference::new("room_id", "base_room").on_delete(OnDelete::Cascade),
    ],
};

pub const ROOM_PARTICIPANTS: AssociationDef = AssociationDef {
    name: "room_participant",
    table: "base_room_participants",
    left: Reference::new("room_id", "base_room").on_delete(OnDelete::Cascade),
    right: Reference::new("user_id", "base_user").on_delete(OnDelete::Cascade),
};

const STUDYBUD_SCHEMA: SchemaDef = SchemaDef {
    entities: &[USER, TOPIC, ROOM, MESSAGE],
    associations: &[ROOM_PARTICIPANTS],
};

/// Returns the StudyBud schema catalogue.
pub fn studybud_schema() -> &'static SchemaDef {
    &STUDYBUD_SCHEMA
}
