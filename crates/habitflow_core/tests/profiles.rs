use habitflow_core::db::open_db_in_memory;
use habitflow_core::store::FixedClock;
use habitflow_core::{NewUserProfile, ProfileService, SqliteDocumentStore};
use std::sync::Arc;

#[test]
fn create_profile_writes_once_and_returns_existing_afterwards() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(FixedClock::new(1_000));
    let store = SqliteDocumentStore::with_clock(&conn, clock.clone()).unwrap();
    let profiles = ProfileService::new(&store);

    let created = profiles
        .create_user_profile(&NewUserProfile::new(
            "uid-1",
            Some("ana@example.com"),
            "  Ana  ",
            None,
        ))
        .unwrap();
    assert_eq!(created.uid, "uid-1");
    assert_eq!(created.email, "ana@example.com");
    assert_eq!(created.display_name, "Ana");
    assert_eq!(created.photo_url, "");
    assert_eq!(created.created_at, 1_000);

    clock.set(9_000);
    let again = profiles
        .create_user_profile(&NewUserProfile::new(
            "uid-1",
            Some("other@example.com"),
            "Someone Else",
            Some("https://example.com/a.png"),
        ))
        .unwrap();
    assert_eq!(again, created);
}

#[test]
fn missing_profile_is_none() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let profile = ProfileService::new(&store).get_user_profile("nobody").unwrap();
    assert!(profile.is_none());
}
