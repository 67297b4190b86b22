//! Connection readiness and schema verification.
//!
//! # Responsibility
//! - Refuse repositories on connections that are not migrated.
//! - Compare a live database against the declared schema catalogue.
//!
//! # Invariants
//! - `ensure_connection_ready` runs on every repository construction.
//! - `verify_schema` is a superset of `ensure_connection_ready`.

use super::error::{RepoError, RepoResult};
use crate::db::migrations::latest_version;
use crate::db::schema_version;
use crate::model::schema::{studybud_schema, Reference};
use rusqlite::Connection;

struct ColumnInfo {
    name: String,
    not_null: bool,
    /// 1-based position in the primary key, 0 when not part of it.
    pk_position: i64,
}

struct ForeignKeyInfo {
    from: String,
    table: String,
    to: Option<String>,
    on_delete: String,
}

/// Checks schema version, tables and columns against the catalogue.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let catalogue = studybud_schema();
    for entity in catalogue.entities {
        if !table_exists(conn, entity.table)? {
            return Err(RepoError::MissingRequiredTable(entity.table));
        }
        let columns = table_columns(conn, entity.table)?;
        for field in entity.fields {
            if !columns.iter().any(|column| column.name == field.name) {
                return Err(RepoError::MissingRequiredColumn {
                    table: entity.table,
                    column: field.name,
                });
            }
        }
    }

    for association in catalogue.associations {
        if !table_exists(conn, association.table)? {
            return Err(RepoError::MissingRequiredTable(association.table));
        }
        let columns = table_columns(conn, association.table)?;
        for column in association.key_columns() {
            if !columns.iter().any(|info| info.name == column) {
                return Err(RepoError::MissingRequiredColumn {
                    table: association.table,
                    column,
                });
            }
        }
    }

    Ok(())
}

/// Verifies nullability, uniqueness, keys and on-delete actions.
///
/// # Errors
/// - Any readiness error from `ensure_connection_ready`.
/// - `SchemaMismatch` naming the first disagreement found.
pub fn verify_schema(conn: &Connection) -> RepoResult<()> {
    ensure_connection_ready(conn)?;
    let catalogue = studybud_schema();

    for entity in catalogue.entities {
        let columns = table_columns(conn, entity.table)?;
        for field in entity.fields.iter().filter(|field| !field.primary_key) {
            let Some(column) = columns.iter().find(|column| column.name == field.name) else {
                continue;
            };
            if column.not_null == field.nullable {
                return Err(RepoError::SchemaMismatch {
                    table: entity.table,
                    detail: format!(
                        "column `{}` nullability differs (declared nullable={})",
                        field.name, field.nullable
                    ),
                });
            }
        }

        for field in entity.fields.iter().filter(|field| field.unique) {
            if !has_single_column_unique_index(conn, entity.table, field.name)? {
                return Err(RepoError::SchemaMismatch {
                    table: entity.table,
                    detail: format!("column `{}` is not unique", field.name),
                });
            }
        }

        let foreign_keys = table_foreign_keys(conn, entity.table)?;
        for reference in entity.references {
            verify_reference(entity.table, reference, &foreign_keys)?;
        }
    }

    for association in catalogue.associations {
        let foreign_keys = table_foreign_keys(conn, association.table)?;
        verify_reference(association.table, &association.left, &foreign_keys)?;
        verify_reference(association.table, &association.right, &foreign_keys)?;

        let mut key_columns: Vec<(i64, String)> = table_columns(conn, association.table)?
            .into_iter()
            .filter(|column| column.pk_position > 0)
            .map(|column| (column.pk_position, column.name))
            .collect();
        key_columns.sort();
        let actual: Vec<&str> = key_columns.iter().map(|(_, name)| name.as_str()).collect();
        if actual != association.key_columns() {
            return Err(RepoError::SchemaMismatch {
                table: association.table,
                detail: format!(
                    "composite key is ({}), expected ({})",
                    actual.join(", "),
                    association.key_columns().join(", ")
                ),
            });
        }
    }

    Ok(())
}

fn verify_reference(
    table: &'static str,
    reference: &Reference,
    foreign_keys: &[ForeignKeyInfo],
) -> RepoResult<()> {
    let Some(found) = foreign_keys.iter().find(|key| key.from == reference.column) else {
        return Err(RepoError::SchemaMismatch {
            table,
            detail: format!("column `{}` has no foreign key", reference.column),
        });
    };

    let target_column = found.to.as_deref().unwrap_or("id");
    if found.table != reference.target_table || target_column != reference.target_column {
        return Err(RepoError::SchemaMismatch {
            table,
            detail: format!(
                "column `{}` references {}.{}, expected {}.{}",
                reference.column,
                found.table,
                target_column,
                reference.target_table,
                reference.target_column
            ),
        });
    }

    if !reference.on_delete.matches_pragma_action(&found.on_delete) {
        return Err(RepoError::SchemaMismatch {
            table,
            detail: format!(
                "column `{}` uses ON DELETE {}, expected {}",
                reference.column,
                found.on_delete,
                reference.on_delete.sql_action()
            ),
        });
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(ColumnInfo {
            name: row.get("name")?,
            not_null: row.get::<_, i64>("notnull")? == 1,
            pk_position: row.get("pk")?,
        });
    }
    Ok(columns)
}

fn table_foreign_keys(conn: &Connection, table: &str) -> RepoResult<Vec<ForeignKeyInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({table});"))?;
    let mut rows = stmt.query([])?;
    let mut keys = Vec::new();
    while let Some(row) = rows.next()? {
        keys.push(ForeignKeyInfo {
            from: row.get("from")?,
            table: row.get("table")?,
            to: row.get("to")?,
            on_delete: row.get("on_delete")?,
        });
    }
    Ok(keys)
}

fn has_single_column_unique_index(
    conn: &Connection,
    table: &str,
    column: &str,
) -> RepoResult<bool> {
    let mut unique_indexes = Vec::new();
    {
        let mut stmt = conn.prepare(&format!("PRAGMA index_list({table});"))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            if row.get::<_, i64>("unique")? == 1 {
                unique_indexes.push(row.get::<_, String>("name")?);
            }
        }
    }

    for index in unique_indexes {
        let mut stmt = conn.prepare(&format!("PRAGMA index_info(\"{index}\");"))?;
        let mut rows = stmt.query([])?;
        let mut columns: Vec<Option<String>> = Vec::new();
        while let Some(row) = rows.next()? {
            columns.push(row.get("name")?);
        }
        if columns.len() == 1 && columns[0].as_deref() == Some(column) {
            return Ok(true);
        }
    }

    Ok(false)
}
