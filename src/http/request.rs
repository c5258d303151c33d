//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Enforce the body size limit
//! - Decode query string and JSON body into a [`DispatchRequest`]
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Path is passed through raw; parameter values are decoded by the matcher
//! - Repeated query keys collect into an array, single keys stay strings
//! - An empty body is `null` whatever its content type

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode};
use serde_json::{Map, Value};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::app::DispatchRequest;

/// Header carrying the request ID in both directions.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request ID of a request or response, if present.
pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(&X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

/// Why a request could not be decoded.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request body is larger than {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Unsupported Media Type: {0}")]
    UnsupportedMediaType(String),

    #[error("Body is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RequestError::MalformedJson(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Buffer and decode an HTTP request.
pub async fn into_dispatch_request(
    request: Request<Body>,
    body_limit: usize,
) -> Result<DispatchRequest, RequestError> {
    let (parts, body) = request.into_parts();

    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > body_limit) {
        return Err(RequestError::PayloadTooLarge { limit: body_limit });
    }

    // Limit exceeded mid-stream; a dropped client never sees this reply.
    let bytes = to_bytes(body, body_limit)
        .await
        .map_err(|_| RequestError::PayloadTooLarge { limit: body_limit })?;

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !is_json(content_type) {
            return Err(RequestError::UnsupportedMediaType(content_type.to_string()));
        }
        serde_json::from_slice(&bytes).map_err(RequestError::MalformedJson)?
    };

    let query = parts.uri.query().map(parse_query).unwrap_or_default();

    Ok(DispatchRequest::new(parts.method, parts.uri.path())
        .with_query(query)
        .with_body(body))
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Decode a query string. Values are strings; repeated keys become arrays.
pub fn parse_query(query: &str) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = Value::String(value.into_owned());
        match out.get_mut(key.as_ref()) {
            None => {
                out.insert(key.into_owned(), value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    out
}
