//! Dispatch table.
//!
//! # Responsibilities
//! - Merge complete groups, rejecting conflicting definitions
//! - Resolve `(method, path)` to one route and its bound parameters
//!
//! # Design Decisions
//! - Two definitions conflict when they share a method and a shape, whatever
//!   their parameter names are
//! - A group is merged all-or-nothing
//! - Among matching patterns the one with a static segment at the first
//!   differing position wins, so lookup never depends on registration order
//! - HEAD falls back to the GET route when no HEAD route is declared

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::routing::group::RegisteredGroup;
use crate::routing::route::RouteDefinition;

/// Two definitions claiming the same method and path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} {pattern} (group `{incoming_group}`) conflicts with {existing} (group `{existing_group}`)")]
pub struct RouteConflict {
    pub method: Method,
    pub pattern: String,
    pub incoming_group: String,
    pub existing: String,
    pub existing_group: String,
}

impl RouteConflict {
    fn between(existing: &RouteDefinition, incoming: &RouteDefinition) -> Self {
        Self {
            method: incoming.method().clone(),
            pattern: incoming.pattern().as_str().to_string(),
            incoming_group: incoming.group().to_string(),
            existing: existing.label(),
            existing_group: existing.group().to_string(),
        }
    }
}

/// A resolved route plus the parameters its pattern bound.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteDefinition>,
    pub params: Map<String, Value>,
}

/// Every route of a composed application.
#[derive(Debug, Default)]
pub struct DispatchTable {
    routes: Vec<Arc<RouteDefinition>>,
    index: HashMap<(Method, String), usize>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a complete group. On conflict nothing from the group is added.
    pub fn merge(&mut self, group: RegisteredGroup) -> Result<(), RouteConflict> {
        let definitions = group.into_definitions();

        let mut incoming: HashMap<(Method, String), usize> = HashMap::new();
        for (position, definition) in definitions.iter().enumerate() {
            let key = key_of(definition);
            if let Some(&existing) = self.index.get(&key) {
                return Err(RouteConflict::between(&self.routes[existing], definition));
            }
            if let Some(&earlier) = incoming.get(&key) {
                return Err(RouteConflict::between(&definitions[earlier], definition));
            }
            incoming.insert(key, position);
        }

        for definition in definitions {
            self.index.insert(key_of(&definition), self.routes.len());
            self.routes.push(Arc::new(definition));
        }
        Ok(())
    }

    /// Resolve a request to a route.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        self.find(method, path).or_else(|| {
            if method == Method::HEAD {
                self.find(&Method::GET, path)
            } else {
                None
            }
        })
    }

    fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let mut best: Option<(Vec<u8>, RouteMatch)> = None;
        for route in self.routes.iter().filter(|r| r.method() == method) {
            let Some(params) = route.pattern().matches(path) else {
                continue;
            };
            let rank = route.pattern().rank();
            if best.as_ref().map_or(true, |(current, _)| rank < *current) {
                best = Some((
                    rank,
                    RouteMatch {
                        route: Arc::clone(route),
                        params,
                    },
                ));
            }
        }
        best.map(|(_, found)| found)
    }

    /// Routes in merge order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn key_of(definition: &RouteDefinition) -> (Method, String) {
    (definition.method().clone(), definition.pattern().shape())
}
