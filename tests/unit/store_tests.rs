use auth_core::error::AuthError;
use auth_core::store::{FlatFileUserStore, MemoryUserStore, NewUser, UserStore};
use tempfile::tempdir;
use uuid::Uuid;

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Jane".to_string(),
        email: email.to_string(),
        password_hash: "$scrypt$fake-hash".to_string(),
    }
}

#[tokio::test]
async fn test_memory_store_create_and_find() {
    let store = MemoryUserStore::new();

    let user = store.create_user(new_user("jane@x.com")).await.unwrap();
    assert_eq!(user.email, "jane@x.com");

    let found = store.find_by_email("jane@x.com").await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.password_hash, "$scrypt$fake-hash");

    assert!(store.find_by_email("john@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_store_duplicate_email() {
    let store = MemoryUserStore::new();

    store.create_user(new_user("jane@x.com")).await.unwrap();
    let err = store.create_user(new_user("jane@x.com")).await.unwrap_err();
    assert!(matches!(err, AuthError::DuplicateEmail));
}

#[tokio::test]
async fn test_memory_store_update_password_hash() {
    let store = MemoryUserStore::new();
    let user = store.create_user(new_user("jane@x.com")).await.unwrap();

    store
        .update_password_hash(user.id, "$scrypt$new-hash")
        .await
        .unwrap();

    let found = store.find_by_email("jane@x.com").await.unwrap().unwrap();
    assert_eq!(found.password_hash, "$scrypt$new-hash");

    let err = store
        .update_password_hash(Uuid::new_v4(), "$scrypt$other")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn test_concurrent_create_same_email_single_winner() {
    let store = MemoryUserStore::new();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.create_user(new_user("jane@x.com")).await
        }));
    }

    let mut created = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AuthError::DuplicateEmail) => duplicates += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(duplicates, 7);
}

#[tokio::test]
async fn test_flat_file_store_round_trip() {
    let dir = tempdir().unwrap();
    let store = FlatFileUserStore::new(dir.path()).unwrap();

    let user = store.create_user(new_user("jane@x.com")).await.unwrap();

    let found = store.find_by_email("jane@x.com").await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.password_hash, "$scrypt$fake-hash");

    store
        .update_password_hash(user.id, "$scrypt$new-hash")
        .await
        .unwrap();
    let found = store.find_by_email("jane@x.com").await.unwrap().unwrap();
    assert_eq!(found.password_hash, "$scrypt$new-hash");

    let err = store.create_user(new_user("jane@x.com")).await.unwrap_err();
    assert!(matches!(err, AuthError::DuplicateEmail));
}

#[tokio::test]
async fn test_flat_file_store_rebuilds_index_on_reload() {
    let dir = tempdir().unwrap();
    let user_id;
    {
        let store = FlatFileUserStore::new(dir.path()).unwrap();
        user_id = store.create_user(new_user("jane@x.com")).await.unwrap().id;
    }

    // A fresh store over the same directory sees the user and still
    // enforces uniqueness.
    let reloaded = FlatFileUserStore::new(dir.path()).unwrap();
    let found = reloaded.find_by_email("jane@x.com").await.unwrap().unwrap();
    assert_eq!(found.id, user_id);
    assert_eq!(found.password_hash, "$scrypt$fake-hash");

    let err = reloaded
        .create_user(new_user("jane@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateEmail));
}

#[tokio::test]
async fn test_flat_file_store_update_unknown_user() {
    let dir = tempdir().unwrap();
    let store = FlatFileUserStore::new(dir.path()).unwrap();

    let err = store
        .update_password_hash(Uuid::new_v4(), "$scrypt$hash")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}
