//! Route group registration.
//!
//! # Responsibilities
//! - Let an independent module declare routes without knowing its final prefix
//! - Collect definitions privately until the group completes
//!
//! # Design Decisions
//! - Registration is an async call; its returned future is the completion signal
//! - A [`RegistrationContext`] is a pending group, a [`RegisteredGroup`] a
//!   complete one. Only complete groups reach the dispatch table
//! - Subpath `/` under a non-empty prefix answers both `prefix/` and `prefix`

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;
use thiserror::Error;

use crate::data::{DataAccess, DataAccessError};
use crate::routing::handler::{BoxedHandler, Handler};
use crate::routing::matcher::{PathPattern, PatternError};
use crate::routing::route::RouteDefinition;
use crate::schema::{SchemaContract, SchemaError};

/// Error signalled by a group instead of completing.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid path `{path}`: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: PatternError,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    DataAccess(#[from] DataAccessError),

    #[error("{0}")]
    Unavailable(String),
}

/// A cohesive bundle of routes registered as one unit.
#[async_trait]
pub trait RouteGroup: Send + Sync {
    /// Name used in logs and conflict reports.
    fn name(&self) -> &str;

    /// Declare routes on `ctx`. Resolving to `Ok` completes the group;
    /// resolving to `Err` aborts composition of the whole app.
    async fn register(&self, ctx: &mut RegistrationContext) -> Result<(), RegistrationError>;
}

/// Registration handle bound to a group's eventual prefix.
pub struct RegistrationContext {
    group: String,
    prefix: String,
    definitions: Vec<RouteDefinition>,
    data: Arc<dyn DataAccess>,
}

impl RegistrationContext {
    pub(crate) fn new(
        group: impl Into<String>,
        prefix: impl Into<String>,
        data: Arc<dyn DataAccess>,
    ) -> Self {
        Self {
            group: group.into(),
            prefix: prefix.into(),
            definitions: Vec::new(),
            data,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Full prefix (app mount point + group prefix) this group is mounted under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Storage capability, for groups that probe a resource before exposing routes.
    pub fn data(&self) -> &dyn DataAccess {
        self.data.as_ref()
    }

    /// Declare a route at `prefix + subpath`.
    pub fn define<H: Handler>(
        &mut self,
        method: Method,
        subpath: &str,
        contract: SchemaContract,
        handler: H,
    ) -> Result<(), RegistrationError> {
        if !subpath.starts_with('/') {
            return Err(RegistrationError::InvalidPath {
                path: subpath.to_string(),
                source: PatternError::MissingLeadingSlash,
            });
        }
        let pattern = parse(&format!("{}{}", self.prefix, subpath))?;
        let handler: BoxedHandler = Arc::new(handler);
        let definition =
            RouteDefinition::new(method, pattern, contract, handler, self.group.clone());

        let alias = if subpath == "/" && !self.prefix.is_empty() {
            Some(definition.alias(parse(&self.prefix)?))
        } else {
            None
        };

        self.definitions.push(definition);
        self.definitions.extend(alias);
        Ok(())
    }

    pub fn get<H: Handler>(
        &mut self,
        subpath: &str,
        contract: SchemaContract,
        handler: H,
    ) -> Result<(), RegistrationError> {
        self.define(Method::GET, subpath, contract, handler)
    }

    pub fn post<H: Handler>(
        &mut self,
        subpath: &str,
        contract: SchemaContract,
        handler: H,
    ) -> Result<(), RegistrationError> {
        self.define(Method::POST, subpath, contract, handler)
    }

    pub fn delete<H: Handler>(
        &mut self,
        subpath: &str,
        contract: SchemaContract,
        handler: H,
    ) -> Result<(), RegistrationError> {
        self.define(Method::DELETE, subpath, contract, handler)
    }

    /// Definitions declared so far, in declaration order.
    pub fn definitions(&self) -> &[RouteDefinition] {
        &self.definitions
    }

    pub(crate) fn finish(self) -> RegisteredGroup {
        RegisteredGroup {
            name: self.group,
            prefix: self.prefix,
            definitions: self.definitions,
        }
    }
}

fn parse(path: &str) -> Result<PathPattern, RegistrationError> {
    PathPattern::parse(path).map_err(|source| RegistrationError::InvalidPath {
        path: path.to_string(),
        source,
    })
}

/// A group whose registration completed successfully.
#[derive(Debug)]
pub struct RegisteredGroup {
    name: String,
    prefix: String,
    definitions: Vec<RouteDefinition>,
}

impl RegisteredGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn definitions(&self) -> &[RouteDefinition] {
        &self.definitions
    }

    pub(crate) fn into_definitions(self) -> Vec<RouteDefinition> {
        self.definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryDataAccess;
    use crate::routing::handler::{HandlerResult, Reply, RequestContext};
    use serde_json::json;

    async fn ok(_ctx: RequestContext) -> HandlerResult {
        Ok(Reply::json(json!({})))
    }

    fn context(prefix: &str) -> RegistrationContext {
        RegistrationContext::new("test", prefix, Arc::new(MemoryDataAccess::new()))
    }

    fn patterns(ctx: &RegistrationContext) -> Vec<String> {
        ctx.definitions()
            .iter()
            .map(|d| d.pattern().as_str().to_string())
            .collect()
    }

    #[test]
    fn test_prefix_is_concatenated() {
        let mut ctx = context("/greetings");
        ctx.get("/work", SchemaContract::new(), ok).unwrap();
        ctx.get("/hello/:name", SchemaContract::new(), ok).unwrap();

        assert_eq!(patterns(&ctx), ["/greetings/work", "/greetings/hello/:name"]);
        assert!(ctx.definitions().iter().all(|d| d.group() == "test"));
    }

    #[test]
    fn test_root_subpath_also_answers_bare_prefix() {
        let mut ctx = context("/books");
        ctx.get("/", SchemaContract::new(), ok).unwrap();
        assert_eq!(patterns(&ctx), ["/books/", "/books"]);

        let mut root = context("");
        root.get("/", SchemaContract::new(), ok).unwrap();
        assert_eq!(patterns(&root), ["/"]);
    }

    #[test]
    fn test_invalid_subpaths_rejected() {
        let mut ctx = context("/books");

        let err = ctx.get("list", SchemaContract::new(), ok).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::InvalidPath { source: PatternError::MissingLeadingSlash, .. }
        ));

        let err = ctx.get("/:", SchemaContract::new(), ok).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::InvalidPath { source: PatternError::EmptyParamName(_), .. }
        ));
        assert!(ctx.definitions().is_empty());
    }

    #[test]
    fn test_finish_keeps_declaration_order() {
        let mut ctx = context("/books");
        ctx.post("/", SchemaContract::new(), ok).unwrap();
        ctx.delete("/:id", SchemaContract::new(), ok).unwrap();

        let group = ctx.finish();
        assert_eq!(group.name(), "test");
        assert_eq!(group.prefix(), "/books");
        let labels: Vec<_> = group.definitions().iter().map(|d| d.label()).collect();
        assert_eq!(labels, ["POST /books/", "POST /books", "DELETE /books/:id"]);
    }

    #[test]
    fn test_empty_group_is_valid() {
        let group = context("/empty").finish();
        assert!(group.into_definitions().is_empty());
    }
}
