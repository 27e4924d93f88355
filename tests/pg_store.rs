//! `PgBookStore` against a live PostgreSQL server.
//!
//! Run with `DATABASE_URL=postgres://... cargo test --test pg_store -- --ignored`.
//! Tests share the `books` table, so each one only looks at rows it created.

use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use bookshelf::{
    app::build_registry,
    books::{
        models::BookPayload,
        store::{BookStore, PgBookStore},
    },
};
use bookshelf_authz::TokenAuthority;
use bookshelf_kernel::settings::DatabaseSettings;
use sqlx::PgPool;
use tokio::sync::Mutex;

/// Concurrent `CREATE TABLE IF NOT EXISTS` can still collide in the catalog.
static SCHEMA: Mutex<()> = Mutex::const_new(());

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at PostgreSQL");
    let settings = DatabaseSettings {
        url,
        ..DatabaseSettings::default()
    };
    let pool = bookshelf_db::connect(&settings).await.unwrap();
    apply_schema(&pool).await;
    pool
}

async fn apply_schema(pool: &PgPool) {
    let authority = Arc::new(TokenAuthority::new(
        b"pg-store-secret",
        Duration::from_secs(60),
        "admin",
        "password",
    ));
    let store = Arc::new(PgBookStore::new(pool.clone()));
    let registry = build_registry(store, authority);

    let _guard = SCHEMA.lock().await;
    bookshelf_db::apply_migrations(pool, &registry.collect_migrations())
        .await
        .unwrap();
}

fn payload(label: &str, year: i32) -> BookPayload {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    BookPayload {
        title: format!("{label} {nanos}"),
        author: "Pg Author".to_string(),
        year,
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn create_returns_stored_columns() {
    let store = PgBookStore::new(pool().await);

    let first = store.create(&payload("first", 2023)).await.unwrap();
    let second = store.create(&payload("second", -44)).await.unwrap();

    assert!(second.id > first.id);
    assert_eq!(first.year, 2023);
    assert_eq!(second.year, -44);
    assert_eq!(second.author, "Pg Author");
    assert_eq!(store.find_by_id(first.id).await.unwrap(), first);
    assert_eq!(store.find_by_id(second.id).await.unwrap(), second);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn find_all_is_ordered_by_id() {
    let store = PgBookStore::new(pool().await);

    let mut created = Vec::new();
    for n in 0..3 {
        created.push(store.create(&payload("listed", 2000 + n)).await.unwrap());
    }

    let all = store.find_all().await.unwrap();
    assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));

    let ours: Vec<_> = all
        .into_iter()
        .filter(|book| created.iter().any(|c| c.id == book.id))
        .collect();
    assert_eq!(ours, created);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn save_replaces_fields_of_existing_rows_only() {
    let store = PgBookStore::new(pool().await);
    let book = store.create(&payload("draft", 1999)).await.unwrap();

    let replaced = payload("final", 2001).apply_to(book.clone());
    let saved = store.save(&replaced).await.unwrap();
    assert_eq!(saved, replaced);
    assert_eq!(store.find_by_id(book.id).await.unwrap(), replaced);

    store.delete(book.id).await.unwrap();
    let err = store.save(&replaced).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn delete_succeeds_once() {
    let store = PgBookStore::new(pool().await);
    let book = store.create(&payload("doomed", 2010)).await.unwrap();

    store.delete(book.id).await.unwrap();

    assert!(store.delete(book.id).await.unwrap_err().is_not_found());
    assert!(store.find_by_id(book.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn schema_can_be_applied_twice() {
    let pool = pool().await;
    let store = PgBookStore::new(pool.clone());
    let book = store.create(&payload("kept", 2020)).await.unwrap();

    apply_schema(&pool).await;

    assert_eq!(store.find_by_id(book.id).await.unwrap(), book);
}
