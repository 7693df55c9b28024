//! Integration tests for the PostgreSQL user store
//!
//! These tests need a reachable PostgreSQL instance (`DATABASE_URL`) and are
//! ignored by default. Run them with `cargo test -- --ignored`.

use common::database::{DatabaseConfig, init_pool, run_migrations};
use uuid::Uuid;

use gateway::{
    models::{Favorite, NewUser, User},
    repositories::{StoreError, UserRepository, UserStore},
};

async fn repository() -> UserRepository {
    let config = DatabaseConfig::from_env().unwrap();
    let pool = init_pool(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();
    UserRepository::new(pool)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        fullname: "Ada Lovelace".to_string(),
        password_hash: "$argon2id$v=19$placeholder".to_string(),
        profile_image_url: "https://www.gravatar.com/avatar/x?d=identicon".to_string(),
    }
}

async fn create_user(repo: &UserRepository) -> User {
    let email = format!("ada-{}@example.com", Uuid::new_v4());
    repo.create(new_user(&email)).await.unwrap()
}

fn ids(favorites: &[Favorite]) -> Vec<&str> {
    favorites.iter().map(|f| f.artist_id.as_str()).collect()
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_duplicate_email_is_rejected() {
    let repo = repository().await;
    let user = create_user(&repo).await;

    let second = repo.create(new_user(&user.email)).await;
    assert!(matches!(second, Err(StoreError::DuplicateEmail)));

    let found = repo.find_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert!(found.favorites.is_empty());

    assert!(repo.delete(user.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_duplicate_add_and_repeated_remove() {
    let repo = repository().await;
    let user = create_user(&repo).await;

    let favorites = repo.add_favorite(user.id, Favorite::new("b")).await.unwrap();
    assert_eq!(ids(&favorites), vec!["b"]);
    let favorites = repo.add_favorite(user.id, Favorite::new("a")).await.unwrap();
    assert_eq!(ids(&favorites), vec!["b", "a"]);

    let again = repo.add_favorite(user.id, Favorite::new("b")).await;
    assert!(matches!(again, Err(StoreError::DuplicateFavorite)));

    assert_eq!(ids(&repo.remove_favorite(user.id, "b").await.unwrap()), vec!["a"]);
    assert_eq!(ids(&repo.remove_favorite(user.id, "b").await.unwrap()), vec!["a"]);
    assert_eq!(ids(&repo.favorites(user.id).await.unwrap()), vec!["a"]);

    assert!(repo.delete(user.id).await.unwrap());
    assert!(!repo.delete(user.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_missing_user_is_not_found() {
    let repo = repository().await;
    let id = Uuid::new_v4();

    assert!(matches!(
        repo.favorites(id).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        repo.add_favorite(id, Favorite::new("x")).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        repo.remove_favorite(id, "x").await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_concurrent_adds_keep_one_entry_per_artist() {
    let repo = repository().await;
    let user = create_user(&repo).await;

    let user_id = user.id;

    // Every artist id is added twice, racing.
    let handles: Vec<_> = (0..40)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.add_favorite(user_id, Favorite::new(format!("artist-{}", i % 20)))
                    .await
            })
        })
        .collect();

    let mut added = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => added += 1,
            Err(StoreError::DuplicateFavorite) => duplicates += 1,
            Err(e) => panic!("unexpected store error: {}", e),
        }
    }

    assert_eq!(added, 20);
    assert_eq!(duplicates, 20);

    let favorites = repo.favorites(user.id).await.unwrap();
    let mut artist_ids = ids(&favorites);
    artist_ids.sort();
    artist_ids.dedup();
    assert_eq!(favorites.len(), 20);
    assert_eq!(artist_ids.len(), 20);

    assert!(repo.delete(user.id).await.unwrap());
}
