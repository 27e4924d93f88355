pub mod handlers;
pub mod models;
pub mod store;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookshelf_kernel::{Access, InitCtx, Migration, Module};
use serde_json::json;

use handlers::SharedStore;

/// CRUD over the `books` table, behind the bearer gate
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn access(&self) -> Access {
        Access::Protected
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(handlers::list_books).post(handlers::create_book))
            .route(
                "/{id}",
                get(handlers::get_book)
                    .put(handlers::update_book)
                    .delete(handlers::delete_book),
            )
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let envelope = |description: &str, data: serde_json::Value| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": {
                                "message": { "type": "string" },
                                "data": data
                            },
                            "required": ["message"]
                        }
                    }
                }
            })
        };
        let bare_envelope = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Envelope" }
                    }
                }
            })
        };
        let book = json!({ "$ref": "#/components/schemas/Book" });
        let books = json!({ "type": "array", "items": book });
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);
        let payload_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookPayload" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": envelope("Every stored book", books),
                            "401": bare_envelope("Missing, invalid or expired token")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": payload_body,
                        "responses": {
                            "201": envelope("Created book", book.clone()),
                            "400": bare_envelope("Malformed body"),
                            "401": bare_envelope("Missing, invalid or expired token")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": envelope("The book", book.clone()),
                            "401": bare_envelope("Missing, invalid or expired token"),
                            "404": bare_envelope("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "requestBody": payload_body,
                        "responses": {
                            "200": envelope("Updated book", book.clone()),
                            "400": bare_envelope("Malformed body"),
                            "401": bare_envelope("Missing, invalid or expired token"),
                            "404": bare_envelope("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": bare_envelope("Book deleted successfully"),
                            "401": bare_envelope("Missing, invalid or expired token"),
                            "404": bare_envelope("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer", "format": "int32" }
                        },
                        "required": ["id", "title", "author", "year"]
                    },
                    "BookPayload": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "author": { "type": "string", "minLength": 1 },
                            "year": { "type": "integer", "format": "int32" }
                        },
                        "required": ["title", "author", "year"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id     BIGSERIAL PRIMARY KEY,
                    title  TEXT    NOT NULL,
                    author TEXT    NOT NULL,
                    year   INTEGER NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: SharedStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use store::MemoryBookStore;

    fn fragment() -> serde_json::Value {
        BooksModule::new(Arc::new(MemoryBookStore::new()))
            .openapi()
            .unwrap()
    }

    #[test]
    fn delete_success_is_a_bare_envelope() {
        let doc = fragment();
        let deleted = &doc["paths"]["/{id}"]["delete"]["responses"]["200"];

        assert_eq!(deleted["description"], "Book deleted successfully");
        assert_eq!(
            deleted["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Envelope"
        );
    }

    #[test]
    fn list_wraps_an_array_of_books() {
        let doc = fragment();
        let listed = &doc["paths"]["/"]["get"]["responses"]["200"];
        let data = &listed["content"]["application/json"]["schema"]["properties"]["data"];

        assert_eq!(data["type"], "array");
        assert_eq!(data["items"]["$ref"], "#/components/schemas/Book");
    }
}
