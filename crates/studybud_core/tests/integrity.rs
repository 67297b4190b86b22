//! Write atomicity and restrict-style references.

use rusqlite::Connection;
use studybud_core::db::open_db_in_memory;
use studybud_core::{
    NewRoom, NewTopic, RepoError, RoomRepository, SqliteRoomRepository, SqliteTopicRepository,
    TopicRepository,
};

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn delete_blocked_by_restrict_reference_is_rejected_and_rolled_back() {
    let conn = open_db_in_memory().unwrap();
    // Auxiliary table with the default (restrict) on-delete behavior.
    conn.execute_batch(
        "CREATE TABLE topic_pins (
            id INTEGER PRIMARY KEY,
            topic_id INTEGER NOT NULL REFERENCES base_topic (id)
        );",
    )
    .unwrap();

    let topics = SqliteTopicRepository::try_new(&conn).unwrap();
    let rooms = SqliteRoomRepository::try_new(&conn).unwrap();
    let math = topics.create_topic(&NewTopic::new("Math")).unwrap();
    let room = rooms
        .create_room(&NewRoom::new("Study").with_topic(math.id))
        .unwrap();
    conn.execute("INSERT INTO topic_pins (topic_id) VALUES (?1);", [math.id])
        .unwrap();

    let err = topics.delete_topic(math.id).unwrap_err();
    assert!(matches!(err, RepoError::Reference { .. }));

    // Neither the delete nor its set-null effect was applied.
    assert!(topics.get_topic(math.id).unwrap().is_some());
    let room = rooms.get_room(room.id).unwrap().unwrap();
    assert_eq!(room.topic_id, Some(math.id));

    conn.execute("DELETE FROM topic_pins;", []).unwrap();
    topics.delete_topic(math.id).unwrap();
}

#[test]
fn rejected_create_leaves_no_row_behind() {
    let conn = open_db_in_memory().unwrap();
    let rooms = SqliteRoomRepository::try_new(&conn).unwrap();

    assert!(matches!(
        rooms.create_room(&NewRoom::new("x".repeat(201))).unwrap_err(),
        RepoError::Validation(_)
    ));
    assert!(matches!(
        rooms
            .create_room(&NewRoom::new("Study").with_topic(7))
            .unwrap_err(),
        RepoError::Reference { .. }
    ));
    assert_eq!(count(&conn, "base_room"), 0);

    // The connection is usable again after the rolled-back transaction.
    rooms.create_room(&NewRoom::new("Study")).unwrap();
    assert_eq!(count(&conn, "base_room"), 1);
}

#[test]
fn storage_checks_back_up_validation() {
    let conn = open_db_in_memory().unwrap();

    let err = conn
        .execute(
            "INSERT INTO base_topic (name) VALUES (?1);",
            [&"t".repeat(201)],
        )
        .unwrap_err();
    assert!(matches!(
        RepoError::from(err),
        RepoError::ConstraintViolation { .. }
    ));

    let err = conn
        .execute("INSERT INTO base_user (username) VALUES ('nopass');", [])
        .unwrap_err();
    assert!(matches!(
        RepoError::from(err),
        RepoError::ConstraintViolation { .. }
    ));
}
