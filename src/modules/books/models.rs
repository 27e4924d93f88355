use serde::{Deserialize, Serialize};

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned identifier, never changes
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i32,
}

/// Request body for creating or replacing a book. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl BookPayload {
    /// Name of the first required text field that is blank, if any.
    pub fn blank_field(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            Some("title")
        } else if self.author.trim().is_empty() {
            Some("author")
        } else {
            None
        }
    }

    /// Overwrite every field of `book`, keeping its id.
    pub fn apply_to(self, book: Book) -> Book {
        Book {
            id: book.id,
            title: self.title,
            author: self.author,
            year: self.year,
        }
    }
}
