#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookshelf::{app::build_registry, books::store::MemoryBookStore};
use bookshelf_authz::TokenAuthority;
use bookshelf_kernel::settings::Settings;
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &[u8] = b"integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryBookStore>,
    pub authority: Arc<TokenAuthority>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryBookStore::new());
        let authority = Arc::new(TokenAuthority::new(
            SECRET,
            Duration::from_secs(15 * 60),
            "admin",
            "password",
        ));
        let registry = build_registry(store.clone(), authority.clone());

        let mut settings = Settings::default();
        settings.auth.jwt_secret = String::from_utf8_lossy(SECRET).into_owned();

        let router = bookshelf_http::build_router(&registry, &settings, authority.clone());
        Self {
            router,
            store,
            authority,
        }
    }

    pub fn token(&self) -> String {
        self.authority.mint(std::time::SystemTime::now()).unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send_request(request.body(body).unwrap()).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
