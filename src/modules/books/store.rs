//! Persistence capability for books.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use bookshelf_db::{classify, StoreError};
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::models::{Book, BookPayload};

/// Operations the book handlers need from a store.
///
/// Lookups and writes that match no row fail with [`StoreError::NotFound`].
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, payload: &BookPayload) -> Result<Book, StoreError>;
    async fn find_all(&self) -> Result<Vec<Book>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Book, StoreError>;
    async fn save(&self, book: &Book) -> Result<Book, StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, payload: &BookPayload) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            "INSERT INTO books (title, author, year) VALUES ($1, $2, $3) \
             RETURNING id, title, author, year",
        )
        .bind(&payload.title)
        .bind(&payload.author)
        .bind(payload.year)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        sqlx::query_as::<_, Book>("SELECT id, title, author, year FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_by_id(&self, id: i64) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>("SELECT id, title, author, year FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound)
    }

    async fn save(&self, book: &Book) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            "UPDATE books SET title = $2, author = $3, year = $4 WHERE id = $1 \
             RETURNING id, title, author, year",
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.year)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
struct Shelf {
    last_id: i64,
    books: BTreeMap<i64, Book>,
}

/// Volatile store for tests and local experiments. Ids start at 1 and are
/// never reused.
#[derive(Default)]
pub struct MemoryBookStore {
    shelf: RwLock<Shelf>,
    calls: AtomicUsize,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.shelf.read().await.books.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, payload: &BookPayload) -> Result<Book, StoreError> {
        self.record();
        let mut shelf = self.shelf.write().await;
        shelf.last_id += 1;
        let book = Book {
            id: shelf.last_id,
            title: payload.title.clone(),
            author: payload.author.clone(),
            year: payload.year,
        };
        shelf.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        self.record();
        Ok(self.shelf.read().await.books.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Book, StoreError> {
        self.record();
        self.shelf
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn save(&self, book: &Book) -> Result<Book, StoreError> {
        self.record();
        let mut shelf = self.shelf.write().await;
        match shelf.books.get_mut(&book.id) {
            Some(slot) => {
                *slot = book.clone();
                Ok(book.clone())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.record();
        self.shelf
            .write()
            .await
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
