//! Uniform `{message, data}` response wrapper.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Body of every JSON response. `data` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// An envelope paired with its status code.
#[derive(Debug)]
pub struct Reply<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T> Reply<T> {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Envelope<T> {
        &self.body
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// 200 with a payload.
pub fn ok<T>(message: impl Into<String>, data: T) -> Reply<T> {
    Reply {
        status: StatusCode::OK,
        body: Envelope::new(message, Some(data)),
    }
}

/// 201 with the created resource.
pub fn created<T>(message: impl Into<String>, data: T) -> Reply<T> {
    Reply {
        status: StatusCode::CREATED,
        body: Envelope::new(message, Some(data)),
    }
}

/// 200 with no payload.
pub fn ok_message(message: impl Into<String>) -> Reply<()> {
    Reply {
        status: StatusCode::OK,
        body: Envelope::new(message, None),
    }
}
