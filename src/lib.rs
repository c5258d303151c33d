//! Greeting and book catalog HTTP service.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────────┐
//!                   │                      BOOKSHELF                       │
//!                   │                                                      │
//!   Client Request  │  ┌─────────┐    ┌──────────┐    ┌──────────────┐     │
//!   ────────────────┼─▶│  http   │───▶│   app    │───▶│   routing    │     │
//!                   │  │ server  │    │ dispatch │    │ table lookup │     │
//!                   │  └─────────┘    └────┬─────┘    └──────────────┘     │
//!                   │                      │                               │
//!                   │                      ▼                               │
//!                   │               ┌─────────────┐     ┌────────────┐     │
//!                   │               │   schema    │     │    api     │     │
//!                   │               │  validate   │────▶│  handlers  │─────┼──▶ data
//!                   │               └─────────────┘     └────────────┘     │   (MySQL)
//!                   │                                                      │
//!                   │  ┌────────────────────────────────────────────────┐  │
//!                   │  │            Cross-Cutting Concerns              │  │
//!                   │  │   config   │   observability   │   lifecycle   │  │
//!                   │  └────────────────────────────────────────────────┘  │
//!                   └──────────────────────────────────────────────────────┘
//! ```
//!
//! Route groups ([`routing::RouteGroup`]) declare routes under a prefix and
//! complete asynchronously; [`app::AppBuilder`] merges them into one
//! conflict-free table. Every request is validated against the route's
//! [`schema::SchemaContract`] before its handler runs, and every reply
//! against the response schema for its status.

// Core subsystems
pub mod app;
pub mod routing;
pub mod schema;

// Service surface
pub mod api;
pub mod data;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use app::{App, AppBuilder, ComposeError, DispatchError, DispatchRequest};
pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
