use std::{sync::Arc, time::SystemTime};

use async_trait::async_trait;
use axum::{body::Bytes, extract::State, routing::post, Router};
use bookshelf_authz::{TokenAuthority, TokenError};
use bookshelf_http::{
    envelope::{self, Reply},
    extract::decode_json,
    AppError,
};
use bookshelf_kernel::{Access, Module};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public login endpoint that issues bearer tokens
pub struct TokenModule {
    authority: Arc<TokenAuthority>,
}

impl TokenModule {
    pub fn new(authority: Arc<TokenAuthority>) -> Self {
        Self { authority }
    }
}

#[async_trait]
impl Module for TokenModule {
    fn name(&self) -> &'static str {
        "token"
    }

    fn access(&self) -> Access {
        Access::Public
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(issue_token))
            .with_state(self.authority.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Exchange credentials for a bearer token",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/LoginRequest" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Signed token valid for the configured TTL",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "message": { "type": "string" },
                                                "data": {
                                                    "type": "object",
                                                    "properties": { "token": { "type": "string" } },
                                                    "required": ["token"]
                                                }
                                            },
                                            "required": ["message", "data"]
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Malformed body",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            },
                            "401": {
                                "description": "Invalid credentials",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "LoginRequest": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string" }
                        },
                        "required": ["username", "password"]
                    }
                }
            }
        }))
    }
}

async fn issue_token(
    State(authority): State<Arc<TokenAuthority>>,
    body: Bytes,
) -> Result<Reply<TokenResponse>, AppError> {
    let login: LoginRequest = decode_json(&body, "Invalid request payload")?;

    match authority.issue(&login.username, &login.password, SystemTime::now()) {
        Ok(token) => {
            tracing::info!(
                username = %login.username,
                ttl_secs = authority.ttl().as_secs(),
                "token issued"
            );
            Ok(envelope::ok(
                "Token generated successfully",
                TokenResponse { token },
            ))
        }
        Err(TokenError::InvalidCredentials) => {
            tracing::warn!(username = %login.username, "login rejected");
            Err(AppError::unauthorized("Invalid credentials"))
        }
        Err(e) => Err(AppError::internal("Could not generate token", e)),
    }
}

/// Create a new instance of the token module
pub fn create_module(authority: Arc<TokenAuthority>) -> Arc<dyn Module> {
    Arc::new(TokenModule::new(authority))
}
