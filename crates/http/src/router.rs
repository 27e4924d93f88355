//! Router builder for the Bookshelf HTTP server

use std::{sync::Arc, time::Duration};

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use bookshelf_authz::TokenAuthority;
use bookshelf_kernel::{Access, ModuleRegistry};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use crate::{envelope::Envelope, gate::require_bearer};

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
    gate: Arc<TokenAuthority>,
}

impl RouterBuilder {
    /// Create a new router builder; `gate` verifies tokens for protected modules
    pub fn new(gate: Arc<TokenAuthority>) -> Self {
        Self {
            router: Router::new(),
            gate,
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/{module_name}`
    ///
    /// Protected modules get the bearer gate as a route layer, so unknown
    /// paths still answer 404 rather than 401.
    pub fn mount_module(
        mut self,
        module_name: &str,
        module_router: Router,
        access: Access,
    ) -> Self {
        let module_router = match access {
            Access::Public => module_router,
            Access::Protected => module_router.route_layer(middleware::from_fn_with_state(
                self.gate.clone(),
                require_bearer,
            )),
        };
        self.router = self.router.nest(&format!("/{}", module_name), module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed back on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Wrap error responses the framework builds itself (unknown path, wrong
    /// method, oversized body, timeout) in the JSON envelope
    pub fn with_error_envelope(mut self) -> Self {
        self.router = self
            .router
            .layer(middleware::map_response(envelope_bare_errors));
        self
    }

    /// Serve the merged OpenAPI document at `/docs/openapi.json`
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let merged = merge_openapi(registry);

        let document = match serde_json::from_value::<utoipa::openapi::OpenApi>(merged.clone()) {
            Ok(doc) => serde_json::to_value(doc).unwrap_or(merged),
            Err(e) => {
                tracing::warn!(error = %e, "OpenAPI document did not validate; serving raw JSON");
                merged
            }
        };

        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { Json(document.clone()) }),
        );
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

/// Merge every module's OpenAPI fragment into one document, prefixing paths
/// with the module mount point and marking protected operations.
pub fn merge_openapi(registry: &ModuleRegistry) -> Value {
    let mut merged = json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Bookshelf API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Book catalogue with JWT-gated CRUD"
        },
        "paths": {},
        "components": {
            "schemas": {
                "Envelope": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "data": {}
                    },
                    "required": ["message"]
                }
            },
            "securitySchemes": {
                "bearerAuth": {
                    "type": "http",
                    "scheme": "bearer",
                    "bearerFormat": "JWT"
                }
            }
        }
    });

    merged["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": { "text/plain": { "schema": { "type": "string" } } }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };
        let protected = module.access() == Access::Protected;

        if let Some(paths) = fragment.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                let prefixed = if path == "/" {
                    format!("/{}", module.name())
                } else {
                    format!("/{}{}", module.name(), path)
                };

                let mut item = item.clone();
                if protected {
                    if let Some(operations) = item.as_object_mut() {
                        for operation in operations.values_mut().filter_map(Value::as_object_mut) {
                            operation.insert("security".to_string(), json!([{ "bearerAuth": [] }]));
                        }
                    }
                }
                merged["paths"][prefixed] = item;
            }
        }

        if let Some(schemas) = fragment
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(Value::as_object)
        {
            for (name, schema) in schemas {
                merged["components"]["schemas"][name] = schema.clone();
            }
        }
    }

    merged
}

async fn envelope_bare_errors(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let message = status.canonical_reason().unwrap_or("Request failed");
    tracing::debug!(status_code = status.as_u16(), "enveloping framework error");

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    let body = Json(Envelope::<()>::new(message, None))
        .into_response()
        .into_body();
    Response::from_parts(parts, body)
}

/// Time-ordered request ids
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
