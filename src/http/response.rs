//! Response construction.
//!
//! # Responsibilities
//! - Wrap rendered bodies in 200 responses
//! - Map dispatch errors to HTTP status codes
//!
//! # Design Decisions
//! - A path that does not decode to UTF-8 is 400
//! - No route, or an unknown trailing segment, is 404
//! - A render failure is 500 with the error text, and affects only that request

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::routing::DispatchError;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// A 200 response carrying `body` verbatim.
pub fn ok(body: Bytes) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_PLAIN)], Body::from(body)).into_response()
}

pub fn status_of(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::MalformedPath { .. } => StatusCode::BAD_REQUEST,
        DispatchError::NoRoute { .. } | DispatchError::UnknownEndpoint { .. } => {
            StatusCode::NOT_FOUND
        }
        DispatchError::Render { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        let body = match status {
            StatusCode::NOT_FOUND => "404 page not found\n".to_string(),
            _ => format!("{self}\n"),
        };
        (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
    }
}
