use rusqlite::Connection;
use studybud_core::db::migrations::latest_version;
use studybud_core::db::{open_db, open_db_in_memory, open_store, table_counts, DbError};
use studybud_core::{verify_schema, RepoError, SqliteUserRepository, StoreConfig};

const INIT_SQL: &str = include_str!("../src/db/migrations/0001_init.sql");

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "base_user",
        "base_topic",
        "base_room",
        "base_message",
        "base_room_participants",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studybud.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO base_user (username, password) VALUES ('alice', 'x');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_store(&StoreConfig::file(&path)).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let counts = table_counts(&conn_second).unwrap();
    assert!(counts.contains(&("base_user", 1)));
    assert!(counts.contains(&("base_room", 0)));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_refuse_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteUserRepository::try_new(&conn)
        .err()
        .expect("unmigrated connection must be rejected");
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn verify_schema_accepts_migrated_database() {
    let conn = open_db_in_memory().unwrap();
    verify_schema(&conn).unwrap();
}

#[test]
fn verify_schema_detects_changed_on_delete_action() {
    let drifted = INIT_SQL.replace(
        "topic_id INTEGER REFERENCES base_topic (id) ON DELETE SET NULL",
        "topic_id INTEGER REFERENCES base_topic (id) ON DELETE CASCADE",
    );
    assert_ne!(drifted, INIT_SQL);
    let conn = raw_database(&drifted);

    match verify_schema(&conn).unwrap_err() {
        RepoError::SchemaMismatch { table, detail } => {
            assert_eq!(table, "base_room");
            assert!(detail.contains("topic_id"), "{detail}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn verify_schema_detects_missing_unique_constraint() {
    let drifted = INIT_SQL.replace(
        "email TEXT UNIQUE CHECK",
        "email TEXT CHECK",
    );
    assert_ne!(drifted, INIT_SQL);
    let conn = raw_database(&drifted);

    match verify_schema(&conn).unwrap_err() {
        RepoError::SchemaMismatch { table, detail } => {
            assert_eq!(table, "base_user");
            assert!(detail.contains("email"), "{detail}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn verify_schema_reports_missing_association_table() {
    let drifted = INIT_SQL
        .split("CREATE TABLE base_room_participants")
        .next()
        .unwrap()
        .to_string();
    let conn = raw_database(&drifted);

    assert!(matches!(
        verify_schema(&conn).unwrap_err(),
        RepoError::MissingRequiredTable("base_room_participants")
    ));
}

fn raw_database(ddl: &str) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(ddl).unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    conn
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
