//! Integration tests for the `users` repository.
//!
//! Each test runs against a fresh SQLite database with the crate's migrations.

use chrono::{Duration, TimeZone, Utc};
use homedash_core::types::Timestamp;
use homedash_db::models::user::{CreateUser, UpdateProfile, User};
use homedash_db::repositories::UserRepo;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap()
}

fn new_user(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        salt: "c2FsdA".to_string(),
        first_name: Some("Test".to_string()),
        last_name: None,
    }
}

async fn insert(pool: &SqlitePool, username: &str) -> User {
    UserRepo::create(pool, &new_user(username), t0())
        .await
        .expect("user creation should succeed")
}

// ---------------------------------------------------------------------------
// Creation and lookup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_starts_with_clean_security_state(pool: SqlitePool) {
    let user = insert(&pool, "alice").await;

    assert!(user.id > 0);
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.failed_attempts, 0);
    assert!(user.locked_until.is_none());
    assert!(user.last_login.is_none());
    assert_eq!(user.created_at, t0());
    assert_eq!(user.updated_at, t0());
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_username_violates_unique_constraint(pool: SqlitePool) {
    insert(&pool, "alice").await;

    let mut dup = new_user("alice");
    dup.email = "other@example.com".to_string();
    let err = UserRepo::create(&pool, &dup, t0())
        .await
        .expect_err("duplicate username must fail");

    match err {
        sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
        other => panic!("expected a database error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn lookup_matches_username_or_email(pool: SqlitePool) {
    let user = insert(&pool, "bob").await;

    let by_name = UserRepo::find_by_username_or_email(&pool, "bob", "bob")
        .await
        .unwrap()
        .expect("username should match");
    assert_eq!(by_name.id, user.id);

    let by_email =
        UserRepo::find_by_username_or_email(&pool, "bob@example.com", "bob@example.com")
            .await
            .unwrap()
            .expect("email should match");
    assert_eq!(by_email.id, user.id);

    let miss = UserRepo::find_by_username_or_email(&pool, "Bob", "BOB@example.com")
        .await
        .unwrap();
    assert!(miss.is_none(), "comparison is case-sensitive");
}

// ---------------------------------------------------------------------------
// Failed-login bookkeeping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn failed_logins_lock_at_threshold(pool: SqlitePool) {
    let user = insert(&pool, "carol").await;
    let lock_until = t0() + Duration::minutes(15);

    for expected in 1..=4 {
        let state = UserRepo::record_failed_login(&pool, user.id, t0(), 5, lock_until)
            .await
            .unwrap()
            .expect("user exists");
        assert_eq!(state.failed_attempts, expected);
        assert!(state.locked_until.is_none(), "no lock before the threshold");
    }

    let state = UserRepo::record_failed_login(&pool, user.id, t0(), 5, lock_until)
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(state.failed_attempts, 5);
    assert_eq!(state.locked_until, Some(lock_until));
}

#[sqlx::test(migrations = "./migrations")]
async fn failure_after_lapsed_lock_restarts_count(pool: SqlitePool) {
    let user = insert(&pool, "dave").await;
    let lock_until = t0() + Duration::minutes(15);

    for _ in 0..5 {
        UserRepo::record_failed_login(&pool, user.id, t0(), 5, lock_until)
            .await
            .unwrap();
    }

    let later = lock_until + Duration::minutes(1);
    let state = UserRepo::record_failed_login(&pool, user.id, later, 5, later + Duration::minutes(15))
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(state.failed_attempts, 1);
    assert!(state.locked_until.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_login_for_missing_user_returns_none(pool: SqlitePool) {
    let state = UserRepo::record_failed_login(&pool, 9999, t0(), 5, t0())
        .await
        .unwrap();
    assert!(state.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn successful_login_resets_counter_and_sets_last_login(pool: SqlitePool) {
    let user = insert(&pool, "erin").await;
    let lock_until = t0() + Duration::minutes(15);
    for _ in 0..3 {
        UserRepo::record_failed_login(&pool, user.id, t0(), 5, lock_until)
            .await
            .unwrap();
    }

    let login_at = t0() + Duration::minutes(2);
    UserRepo::record_successful_login(&pool, user.id, login_at)
        .await
        .unwrap();

    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.failed_attempts, 0);
    assert!(user.locked_until.is_none());
    assert_eq!(user.last_login, Some(login_at));
    assert_eq!(user.updated_at, login_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn active_lock_ignores_lapsed_expiry(pool: SqlitePool) {
    let user = insert(&pool, "frank").await;
    let lock_until = t0() + Duration::minutes(15);
    for _ in 0..5 {
        UserRepo::record_failed_login(&pool, user.id, t0(), 5, lock_until)
            .await
            .unwrap();
    }

    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.active_lock(t0()), Some(lock_until));
    assert_eq!(user.active_lock(lock_until), None, "a lock ends at its expiry");
    assert_eq!(user.active_lock(lock_until + Duration::seconds(1)), None);
}

// ---------------------------------------------------------------------------
// Identity conflicts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn identity_conflict_spans_both_columns(pool: SqlitePool) {
    let alice = insert(&pool, "alice").await;

    // New username equal to an existing email.
    let hit = UserRepo::find_identity_conflict(&pool, "alice@example.com", "fresh@example.com", None)
        .await
        .unwrap()
        .expect("username colliding with an email must conflict");
    assert_eq!(hit.id, alice.id);

    // New email equal to an existing username.
    let hit = UserRepo::find_identity_conflict(&pool, "fresh", "alice", None)
        .await
        .unwrap()
        .expect("email colliding with a username must conflict");
    assert_eq!(hit.id, alice.id);

    let miss = UserRepo::find_identity_conflict(&pool, "fresh", "fresh@example.com", None)
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn identity_conflict_skips_excluded_account(pool: SqlitePool) {
    let alice = insert(&pool, "alice").await;
    let bob = insert(&pool, "bob").await;

    let own = UserRepo::find_identity_conflict(
        &pool,
        "alice@example.com",
        "alice@example.com",
        Some(alice.id),
    )
    .await
    .unwrap();
    assert!(own.is_none(), "keeping one's own email is not a conflict");

    let other = UserRepo::find_identity_conflict(&pool, "bob", "bob", Some(alice.id))
        .await
        .unwrap()
        .expect("another account's username still conflicts");
    assert_eq!(other.id, bob.id);
}

// ---------------------------------------------------------------------------
// Profile and password updates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn profile_update_only_touches_supplied_fields(pool: SqlitePool) {
    let user = insert(&pool, "grace").await;
    let later = t0() + Duration::hours(1);

    let input = UpdateProfile {
        last_name: Some(Some("Hopper".to_string())),
        bio: Some(Some("Compilers".to_string())),
        ..Default::default()
    };
    let updated = UserRepo::update_profile(&pool, user.id, &input, later)
        .await
        .unwrap()
        .expect("user exists");

    assert_eq!(updated.first_name.as_deref(), Some("Test"));
    assert_eq!(updated.last_name.as_deref(), Some("Hopper"));
    assert_eq!(updated.bio.as_deref(), Some("Compilers"));
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.password_hash, user.password_hash);
    assert_eq!(updated.created_at, t0());
    assert_eq!(updated.updated_at, later);
}

#[sqlx::test(migrations = "./migrations")]
async fn profile_update_can_clear_optional_fields(pool: SqlitePool) {
    let user = insert(&pool, "ivan").await;
    assert_eq!(user.first_name.as_deref(), Some("Test"));

    let input = UpdateProfile {
        first_name: Some(None),
        location: Some(Some("Lab 2".to_string())),
        ..Default::default()
    };
    let updated = UserRepo::update_profile(&pool, user.id, &input, t0())
        .await
        .unwrap()
        .expect("user exists");
    assert!(updated.first_name.is_none(), "explicit None clears the column");
    assert_eq!(updated.location.as_deref(), Some("Lab 2"));

    let input = UpdateProfile {
        bio: Some(Some("Notes".to_string())),
        ..Default::default()
    };
    let updated = UserRepo::update_profile(&pool, user.id, &input, t0())
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(updated.location.as_deref(), Some("Lab 2"), "absent field is kept");
    assert!(updated.first_name.is_none());
    assert_eq!(updated.email, "ivan@example.com");
}

#[sqlx::test(migrations = "./migrations")]
async fn profile_update_for_missing_user_returns_none(pool: SqlitePool) {
    let updated = UserRepo::update_profile(&pool, 42, &UpdateProfile::default(), t0())
        .await
        .unwrap();
    assert!(updated.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn update_password_replaces_hash_and_salt(pool: SqlitePool) {
    let user = insert(&pool, "heidi").await;

    let changed = UserRepo::update_password(&pool, user.id, "new-hash", "new-salt", t0())
        .await
        .unwrap();
    assert!(changed);

    let user = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(user.password_hash, "new-hash");
    assert_eq!(user.salt, "new-salt");

    let missing = UserRepo::update_password(&pool, 9999, "x", "y", t0())
        .await
        .unwrap();
    assert!(!missing);
}
