//! Bearer-token gate applied to protected modules.

use std::{sync::Arc, time::SystemTime};

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use bookshelf_authz::{Gate, RejectReason, TokenAuthority};

use crate::error::AppError;

/// Forward the request only if it carries a valid, unexpired bearer token.
pub async fn require_bearer(
    State(authority): State<Arc<TokenAuthority>>,
    request: Request,
    next: Next,
) -> Response {
    let verdict = match request.headers().get(AUTHORIZATION) {
        None => authority.check_header(None, SystemTime::now()),
        Some(value) => match value.to_str() {
            Ok(value) => authority.check_header(Some(value), SystemTime::now()),
            Err(_) => Gate::Reject(RejectReason::Malformed),
        },
    };

    match verdict {
        Gate::Allow => next.run(request).await,
        Gate::Reject(reason) => {
            tracing::debug!(
                reason = reason.as_str(),
                method = %request.method(),
                path = %request.uri().path(),
                "request rejected by auth gate"
            );
            AppError::unauthorized(reason.message()).into_response()
        }
    }
}
