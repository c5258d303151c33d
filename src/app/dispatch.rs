//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! DispatchRequest (method, path, query, body)
//!     → DispatchTable::lookup          → NotFound
//!     → params, body, querystring      → prepare + validate → Validation
//!     → Handler::call(RequestContext)  → DataAccess / Handler
//!     → response schema for status     → ContractBreach
//!     → Reply
//! ```
//!
//! # Design Decisions
//! - The handler never runs when an inbound part fails its schema
//! - A reply that breaks its response schema is never forwarded
//! - Parts without a schema pass through untouched

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::app::App;
use crate::data::DataAccessError;
use crate::observability::metrics;
use crate::routing::{HandlerError, Reply, RequestContext, RouteDefinition, RouteMatch};
use crate::schema::{prepare, validate, FieldViolation, Part, SchemaContract};

/// Transport-independent request handed to [`App::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    method: Method,
    path: String,
    query: Map<String, Value>,
    body: Value,
}

impl DispatchRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Map::new(),
            body: Value::Null,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = query;
        self
    }

    /// Add one query parameter.
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Why a request did not produce a reply.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Route {method}:{path} not found")]
    NotFound { method: Method, path: String },

    #[error("{}", Violations(.part, .violations))]
    Validation {
        part: Part,
        violations: Vec<FieldViolation>,
    },

    #[error("reply from {route} violates its {status} response schema")]
    ContractBreach {
        route: String,
        status: u16,
        violations: Vec<FieldViolation>,
    },

    #[error("data access failed in {route}: {source}")]
    DataAccess {
        route: String,
        #[source]
        source: DataAccessError,
    },

    #[error("handler for {route} failed: {source}")]
    Handler {
        route: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::Validation { .. } => StatusCode::BAD_REQUEST,
            DispatchError::ContractBreach { .. }
            | DispatchError::DataAccess { .. }
            | DispatchError::Handler { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

struct Violations<'a>(&'a Part, &'a [FieldViolation]);

impl fmt::Display for Violations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.1.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&violation.describe(*self.0))?;
        }
        Ok(())
    }
}

impl App {
    /// Route one request through lookup, validation, the handler and the
    /// response contract.
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<Reply, DispatchError> {
        let start = Instant::now();
        let method = request.method.clone();

        let (route, result) = match self.table.lookup(&request.method, &request.path) {
            Some(found) => {
                let pattern = found.route.pattern().as_str().to_string();
                (pattern, self.run(found, request).await)
            }
            None => {
                tracing::debug!(method = %request.method, path = %request.path, "No route matched");
                let err = DispatchError::NotFound {
                    method: request.method,
                    path: request.path,
                };
                (metrics::UNMATCHED.to_string(), Err(err))
            }
        };

        let status = match &result {
            Ok(reply) => reply.status(),
            Err(err) => err.status(),
        };
        metrics::record_request(method.as_str(), &route, status.as_u16(), start);
        result
    }

    async fn run(
        &self,
        found: RouteMatch,
        request: DispatchRequest,
    ) -> Result<Reply, DispatchError> {
        let RouteMatch { route, params } = found;
        let contract = route.contract();

        let params = inbound(contract, Part::Params, Value::Object(params))?;
        let body = inbound(contract, Part::Body, request.body)?;
        let query = inbound(contract, Part::Query, Value::Object(request.query))?;

        let ctx = RequestContext::new(
            into_map(params),
            into_map(query),
            body,
            Arc::clone(&self.data),
        );
        let reply = route
            .handler()
            .call(ctx)
            .await
            .map_err(|err| handler_failure(&route, err))?;

        outbound(&route, reply)
    }
}

fn inbound(contract: &SchemaContract, part: Part, value: Value) -> Result<Value, DispatchError> {
    let Some(schema) = contract.schema_for(part) else {
        return Ok(value);
    };
    let value = prepare(part, value, schema);
    if let Err(violations) = validate(&value, schema) {
        tracing::debug!(part = %part, violations = violations.len(), "Request rejected by schema");
        return Err(DispatchError::Validation { part, violations });
    }
    Ok(value)
}

fn outbound(route: &RouteDefinition, reply: Reply) -> Result<Reply, DispatchError> {
    let status = reply.status().as_u16();
    let Some(schema) = route.contract().response_for(status) else {
        return Ok(reply);
    };
    match validate(reply.body(), schema) {
        Ok(()) => Ok(reply),
        Err(violations) => {
            tracing::error!(
                route = %route.label(),
                group = %route.group(),
                status,
                violations = ?violations,
                "Reply violates response contract"
            );
            metrics::record_contract_breach(route.pattern().as_str(), status);
            Err(DispatchError::ContractBreach {
                route: route.label(),
                status,
                violations,
            })
        }
    }
}

fn handler_failure(route: &RouteDefinition, err: HandlerError) -> DispatchError {
    match err {
        HandlerError::DataAccess(source) => {
            tracing::error!(
                route = %route.label(),
                kind = source.kind(),
                error = %source,
                "Data access failed"
            );
            metrics::record_data_access_error(source.kind());
            DispatchError::DataAccess {
                route: route.label(),
                source,
            }
        }
        source => {
            tracing::error!(route = %route.label(), error = %source, "Handler failed");
            DispatchError::Handler {
                route: route.label(),
                source,
            }
        }
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
