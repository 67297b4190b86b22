//! Writers on separate file connections racing for the same unique value.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;
use studybud_core::db::open_db;
use studybud_core::{
    ConstraintKind, NewRoom, NewUser, ParticipantRepository, RepoError, RoomRepository,
    SqliteParticipantRepository, SqliteRoomRepository, SqliteUserRepository, UserRepository,
};

const WRITERS: usize = 8;

/// Runs `write` once per writer thread, each on its own connection, all
/// released together.
fn race<F>(path: &Path, write: F) -> Vec<Result<(), RepoError>>
where
    F: Fn(&rusqlite::Connection) -> Result<(), RepoError> + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(WRITERS));
    let write = Arc::new(write);
    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let path: PathBuf = path.to_path_buf();
            let barrier = Arc::clone(&barrier);
            let write = Arc::clone(&write);
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                barrier.wait();
                write(&conn)
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

#[test]
fn racing_creates_of_same_username_yield_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race_users.db");
    drop(open_db(&path).unwrap());

    let results = race(&path, |conn| {
        let repo = SqliteUserRepository::try_new(conn)?;
        repo.create_user(&NewUser::new("alice", "x")).map(|_| ())
    });

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert!(
            matches!(
                err,
                RepoError::ConstraintViolation {
                    kind: ConstraintKind::Unique,
                    ..
                }
            ),
            "unexpected error: {err}"
        );
    }

    let conn = open_db(&path).unwrap();
    let stored: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM base_user WHERE username = 'alice';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, 1);
}

#[test]
fn racing_joins_of_same_pair_link_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race_joins.db");
    let (room_id, user_id) = {
        let conn = open_db(&path).unwrap();
        let user = SqliteUserRepository::try_new(&conn)
            .unwrap()
            .create_user(&NewUser::new("alice", "x"))
            .unwrap();
        let room = SqliteRoomRepository::try_new(&conn)
            .unwrap()
            .create_room(&NewRoom::new("Study"))
            .unwrap();
        (room.id, user.id)
    };

    let results = race(&path, move |conn| {
        let repo = SqliteParticipantRepository::try_new(conn)?;
        repo.join_room(room_id, user_id).map(|_| ())
    });

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert!(
            matches!(err, RepoError::ConstraintViolation { .. }) && err.is_unique_violation(),
            "unexpected error: {err}"
        );
    }

    let conn = open_db(&path).unwrap();
    let room = SqliteRoomRepository::try_new(&conn)
        .unwrap()
        .get_room(room_id)
        .unwrap()
        .unwrap();
    assert_eq!(room.joined_count, 1);
}
