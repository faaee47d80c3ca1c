//! Integration tests for the PostgreSQL item and user repositories.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.
//!
//! Run with: `cargo test --test postgres_items -- --ignored`

use chrono::Utc;
use uuid::Uuid;
use vote_ledger_repository::{
    ItemRepository, ItemRepositoryError, PostgresItemRepository, PostgresUserRepository,
    UserRepository,
};
use vote_ledger_shared::types::{ItemScores, ScoredItem, Voter};

fn make_item(collection: &str) -> ScoredItem {
    ScoredItem::new(Uuid::new_v4(), collection, Some(Uuid::new_v4()), Utc::now())
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_save_and_get_item(pool: sqlx::PgPool) {
    let repository = PostgresItemRepository::new(pool).await.unwrap();
    let item = make_item("posts");

    repository.save_item(&item).await.unwrap();

    let stored = repository.get_item("posts", item.id).await.unwrap().unwrap();
    assert_eq!(stored.author_id, item.author_id);
    assert_eq!(stored.scores(), item.scores());
    assert!(repository.get_item("comments", item.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_update_scores_clears_inactive(pool: sqlx::PgPool) {
    let repository = PostgresItemRepository::new(pool).await.unwrap();
    let mut item = make_item("posts");
    item.inactive = true;
    repository.save_item(&item).await.unwrap();

    let scores = ItemScores {
        base_score: 9,
        score: 1.2,
        vote_count: 3,
    };
    repository.update_scores("posts", item.id, scores).await.unwrap();

    let stored = repository.get_item("posts", item.id).await.unwrap().unwrap();
    assert_eq!(stored.scores(), scores);
    assert!(!stored.inactive);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_update_scores_of_missing_item(pool: sqlx::PgPool) {
    let repository = PostgresItemRepository::new(pool).await.unwrap();
    let result = repository
        .update_scores(
            "posts",
            Uuid::new_v4(),
            ItemScores {
                base_score: 1,
                score: 0.0,
                vote_count: 1,
            },
        )
        .await;
    assert!(matches!(result, Err(ItemRepositoryError::ItemNotFound { .. })));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_list_item_ids_by_collection(pool: sqlx::PgPool) {
    let repository = PostgresItemRepository::new(pool).await.unwrap();
    let post = make_item("posts");
    let comment = make_item("comments");
    repository.save_item(&post).await.unwrap();
    repository.save_item(&comment).await.unwrap();

    assert_eq!(repository.list_item_ids("posts").await.unwrap(), vec![post.id]);
    assert_eq!(repository.list_item_ids("comments").await.unwrap(), vec![comment.id]);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn test_save_and_get_user(pool: sqlx::PgPool) {
    let repository = PostgresUserRepository::new(pool).await.unwrap();
    let voter = Voter::new(Uuid::new_v4(), 1200);

    repository.save_user(&voter).await.unwrap();
    assert_eq!(repository.get_user(voter.id).await.unwrap(), Some(voter));
    assert!(repository.get_user(Uuid::new_v4()).await.unwrap().is_none());
}
