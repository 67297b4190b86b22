use studybud_core::db::open_db_in_memory;
use studybud_core::{
    ConstraintKind, ListQuery, NewUser, RepoError, SqliteUserRepository, UserRepository,
    UserService, UserUpdate, ValidationError,
};

#[test]
fn create_applies_schema_defaults() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let user = repo
        .create_user(&NewUser::new("alice", "pbkdf2$secret"))
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.avatar.as_deref(), Some("avatar.svg"));
    assert!(user.is_active);
    assert!(!user.is_staff);
    assert!(!user.is_superuser);
    assert!(user.date_joined > 0);
    assert_eq!(user.last_login, None);

    let loaded = repo.get_user_by_username("alice").unwrap().unwrap();
    assert_eq!(loaded, user);
}

#[test]
fn duplicate_username_is_a_unique_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    repo.create_user(&NewUser::new("alice", "x")).unwrap();

    let err = repo.create_user(&NewUser::new("alice", "y")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation {
            kind: ConstraintKind::Unique,
            ..
        }
    ));

    // Uniqueness is exact-match only.
    repo.create_user(&NewUser::new("Alice", "y")).unwrap();
    assert_eq!(repo.list_users(&ListQuery::default()).unwrap().len(), 2);
}

#[test]
fn duplicate_email_is_rejected_but_missing_emails_coexist() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.create_user(&NewUser::new("alice", "x").with_email("a@example.com"))
        .unwrap();
    let err = repo
        .create_user(&NewUser::new("bob", "x").with_email("a@example.com"))
        .unwrap_err();
    assert!(err.is_unique_violation());

    repo.create_user(&NewUser::new("carol", "x")).unwrap();
    repo.create_user(&NewUser::new("dave", "x")).unwrap();
}

#[test]
fn overlong_username_fails_validation_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let err = repo
        .create_user(&NewUser::new("u".repeat(151), "x"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::TooLong {
            field: "username",
            actual: 151,
            ..
        })
    ));
    assert!(repo.list_users(&ListQuery::default()).unwrap().is_empty());
}

#[test]
fn bio_only_update_leaves_other_fields_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let before = repo
        .create_user(
            &NewUser::new("alice", "x")
                .with_email("a@example.com")
                .with_name("Alice"),
        )
        .unwrap();

    let after = repo
        .update_user(
            before.id,
            &UserUpdate {
                bio: Some(Some("studies rust".to_string())),
                ..UserUpdate::default()
            },
        )
        .unwrap();

    assert_eq!(after.bio.as_deref(), Some("studies rust"));
    assert_eq!(after.username, before.username);
    assert_eq!(after.email, before.email);
    assert_eq!(after.name, before.name);
    assert_eq!(after.password, before.password);
    assert_eq!(after.avatar, before.avatar);
    assert_eq!(after.date_joined, before.date_joined);
}

#[test]
fn update_can_clear_nullable_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let user = repo
        .create_user(&NewUser::new("alice", "x").with_email("a@example.com"))
        .unwrap();

    let cleared = repo
        .update_user(
            user.id,
            &UserUpdate {
                email: Some(None),
                avatar: Some(None),
                ..UserUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.email, None);
    assert_eq!(cleared.avatar, None);
}

#[test]
fn failed_update_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    repo.create_user(&NewUser::new("alice", "x")).unwrap();
    let bob = repo.create_user(&NewUser::new("bob", "x")).unwrap();

    let err = repo
        .update_user(
            bob.id,
            &UserUpdate {
                username: Some("alice".to_string()),
                bio: Some(Some("hijack".to_string())),
                ..UserUpdate::default()
            },
        )
        .unwrap_err();
    assert!(err.is_unique_violation());

    let reloaded = repo.get_user(bob.id).unwrap().unwrap();
    assert_eq!(reloaded, bob);
}

#[test]
fn update_and_delete_missing_user_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.update_user(42, &UserUpdate::default()).unwrap_err(),
        RepoError::NotFound {
            entity: "user",
            id: 42
        }
    ));
    assert!(matches!(
        repo.delete_user(42).unwrap_err(),
        RepoError::NotFound { .. }
    ));
    assert!(matches!(
        repo.record_login(42, 1_700_000_000_000).unwrap_err(),
        RepoError::NotFound { .. }
    ));
}

#[test]
fn record_login_stamps_last_login() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let user = repo.create_user(&NewUser::new("alice", "x")).unwrap();

    repo.record_login(user.id, 1_700_000_000_000).unwrap();

    let loaded = repo.get_user(user.id).unwrap().unwrap();
    assert_eq!(loaded.last_login, Some(1_700_000_000_000));
}

#[test]
fn list_users_respects_window() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    for name in ["a", "b", "c", "d"] {
        repo.create_user(&NewUser::new(name, "x")).unwrap();
    }

    let page = repo.list_users(&ListQuery::new(1, 2)).unwrap();
    let names: Vec<&str> = page.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(names, vec!["b", "c"]);
}

#[test]
fn public_profiles_never_serialize_password() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());
    let user = service
        .register(&NewUser::new("alice", "very-secret"))
        .unwrap();

    let profile = service.get_profile(user.id).unwrap().unwrap();
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["username"], "alice");
    assert!(json.get("password").is_none());
    assert!(!json.to_string().contains("very-secret"));

    let profiles = service.list_profiles(&ListQuery::default()).unwrap();
    assert_eq!(profiles, vec![profile]);
    assert!(service.get_profile(user.id + 1).unwrap().is_none());
}
