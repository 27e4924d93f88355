use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
};
use bookshelf_db::StoreError;
use bookshelf_http::{
    envelope::{self, Reply},
    extract::decode_json,
    AppError,
};

use super::models::{Book, BookPayload};
use super::store::BookStore;

pub type SharedStore = Arc<dyn BookStore>;

const INVALID_INPUT: &str = "Invalid input";
const NOT_FOUND: &str = "Book not found";

pub async fn create_book(
    State(store): State<SharedStore>,
    body: Bytes,
) -> Result<Reply<Book>, AppError> {
    let payload = parse_payload(&body)?;
    let book = store.create(&payload).await.map_err(store_error)?;

    tracing::info!(book_id = book.id, "book created");
    Ok(envelope::created("Book created successfully", book))
}

pub async fn list_books(State(store): State<SharedStore>) -> Result<Reply<Vec<Book>>, AppError> {
    let books = store.find_all().await.map_err(store_error)?;
    Ok(envelope::ok("Books retrieved successfully", books))
}

pub async fn get_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Reply<Book>, AppError> {
    let id = parse_id(&id)?;
    let book = store.find_by_id(id).await.map_err(store_error)?;
    Ok(envelope::ok("Book retrieved successfully", book))
}

/// Full replace: the book must exist before the body is even looked at.
pub async fn update_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Reply<Book>, AppError> {
    let id = parse_id(&id)?;
    let existing = store.find_by_id(id).await.map_err(store_error)?;
    let payload = parse_payload(&body)?;

    let book = store
        .save(&payload.apply_to(existing))
        .await
        .map_err(store_error)?;

    tracing::info!(book_id = book.id, "book updated");
    Ok(envelope::ok("Book updated successfully", book))
}

pub async fn delete_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Reply<()>, AppError> {
    let id = parse_id(&id)?;
    store.delete(id).await.map_err(store_error)?;

    tracing::info!(book_id = id, "book deleted");
    Ok(envelope::ok_message("Book deleted successfully"))
}

/// Ids that are not integers cannot name a book.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::not_found(NOT_FOUND))
}

fn parse_payload(body: &[u8]) -> Result<BookPayload, AppError> {
    let payload: BookPayload = decode_json(body, INVALID_INPUT)?;
    if let Some(field) = payload.blank_field() {
        tracing::debug!(field, "book payload has a blank required field");
        return Err(AppError::validation(INVALID_INPUT));
    }
    Ok(payload)
}

fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound => AppError::not_found(NOT_FOUND),
        StoreError::Database(e) => AppError::internal("Could not access book store", e),
    }
}
