use rusqlite::Connection;
use studybud_core::db::open_db_in_memory;
use studybud_core::{
    MessageRepository, MessageService, NewMessage, NewRoom, NewUser, RepoError, RoomRepository,
    SqliteMessageRepository, SqliteRoomRepository, SqliteUserRepository, UserRepository,
};

fn seed_user_and_room(conn: &Connection) -> (i64, i64) {
    let users = SqliteUserRepository::try_new(conn).unwrap();
    let rooms = SqliteRoomRepository::try_new(conn).unwrap();
    let user = users.create_user(&NewUser::new("alice", "x")).unwrap();
    let room = rooms
        .create_room(&NewRoom::new("Study").hosted_by(user.id))
        .unwrap();
    (user.id, room.id)
}

fn message_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM base_message;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn post_and_read_back_in_room_order() {
    let conn = open_db_in_memory().unwrap();
    let (user, room) = seed_user_and_room(&conn);
    let service = MessageService::new(SqliteMessageRepository::try_new(&conn).unwrap());

    let first = service.post(user, room, "hello").unwrap();
    let second = service.post(user, room, "anyone here?").unwrap();
    assert!(first.created > 0);
    assert_eq!(first.updated, None);

    let bodies: Vec<String> = service
        .room_messages(room)
        .unwrap()
        .into_iter()
        .map(|message| message.body)
        .collect();
    assert_eq!(bodies, vec!["hello", "anyone here?"]);
    assert_eq!(service.user_messages(user).unwrap().len(), 2);
    assert_eq!(service.get_message(second.id).unwrap(), Some(second));
}

#[test]
fn edit_replaces_body_and_stamps_updated() {
    let conn = open_db_in_memory().unwrap();
    let (user, room) = seed_user_and_room(&conn);
    let service = MessageService::new(SqliteMessageRepository::try_new(&conn).unwrap());
    let message = service.post(user, room, "helo").unwrap();

    let edited = service.edit(message.id, "hello").unwrap();
    assert_eq!(edited.body, "hello");
    assert_eq!(edited.created, message.created);
    assert!(edited.updated.is_some());

    assert!(matches!(
        service.edit(message.id + 1, "nope").unwrap_err(),
        RepoError::NotFound {
            entity: "message",
            ..
        }
    ));
}

#[test]
fn message_with_missing_room_or_user_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let (user, room) = seed_user_and_room(&conn);
    let repo = SqliteMessageRepository::try_new(&conn).unwrap();

    let err = repo
        .create_message(&NewMessage::new(user, room + 100, "lost"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Reference { .. }));

    let err = repo
        .create_message(&NewMessage::new(user + 100, room, "lost"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Reference { .. }));

    assert_eq!(message_count(&conn), 0);
}

#[test]
fn deleting_room_deletes_its_messages() {
    let conn = open_db_in_memory().unwrap();
    let (user, room) = seed_user_and_room(&conn);
    let rooms = SqliteRoomRepository::try_new(&conn).unwrap();
    let other = rooms.create_room(&NewRoom::new("Other")).unwrap();
    let messages = SqliteMessageRepository::try_new(&conn).unwrap();
    messages
        .create_message(&NewMessage::new(user, room, "one"))
        .unwrap();
    messages
        .create_message(&NewMessage::new(user, room, "two"))
        .unwrap();
    let kept = messages
        .create_message(&NewMessage::new(user, other.id, "three"))
        .unwrap();

    rooms.delete_room(room).unwrap();

    assert!(messages.list_messages_for_room(room).unwrap().is_empty());
    assert_eq!(messages.list_messages_for_user(user).unwrap(), vec![kept]);
}

#[test]
fn deleting_user_deletes_their_messages() {
    let conn = open_db_in_memory().unwrap();
    let (alice, room) = seed_user_and_room(&conn);
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let bob = users.create_user(&NewUser::new("bob", "x")).unwrap();
    let messages = SqliteMessageRepository::try_new(&conn).unwrap();
    messages
        .create_message(&NewMessage::new(alice, room, "from alice"))
        .unwrap();
    let from_bob = messages
        .create_message(&NewMessage::new(bob.id, room, "from bob"))
        .unwrap();

    users.delete_user(alice).unwrap();

    assert_eq!(messages.list_messages_for_room(room).unwrap(), vec![from_bob]);
    assert_eq!(message_count(&conn), 1);
}

#[test]
fn delete_message_removes_only_that_row() {
    let conn = open_db_in_memory().unwrap();
    let (user, room) = seed_user_and_room(&conn);
    let service = MessageService::new(SqliteMessageRepository::try_new(&conn).unwrap());
    let gone = service.post(user, room, "typo").unwrap();
    service.post(user, room, "fixed").unwrap();

    service.delete_message(gone.id).unwrap();

    assert!(service.get_message(gone.id).unwrap().is_none());
    assert_eq!(message_count(&conn), 1);
    assert!(matches!(
        service.delete_message(gone.id).unwrap_err(),
        RepoError::NotFound { .. }
    ));
}
