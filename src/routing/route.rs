//! Route definitions.

use std::fmt;

use axum::http::Method;

use crate::routing::handler::BoxedHandler;
use crate::routing::matcher::PathPattern;
use crate::schema::SchemaContract;

/// One registered route. Immutable once its group completes.
#[derive(Clone)]
pub struct RouteDefinition {
    method: Method,
    pattern: PathPattern,
    contract: SchemaContract,
    handler: BoxedHandler,
    group: String,
}

impl RouteDefinition {
    pub(crate) fn new(
        method: Method,
        pattern: PathPattern,
        contract: SchemaContract,
        handler: BoxedHandler,
        group: String,
    ) -> Self {
        Self {
            method,
            pattern,
            contract,
            handler,
            group,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn contract(&self) -> &SchemaContract {
        &self.contract
    }

    pub(crate) fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// Name of the group that declared this route.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// `METHOD /pattern`, used in logs and errors.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.pattern)
    }

    /// Same handler and contract, answering on another pattern.
    pub(crate) fn alias(&self, pattern: PathPattern) -> Self {
        Self {
            pattern,
            ..self.clone()
        }
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}
