//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Composition (at startup):
//!     RouteGroup::register(&mut RegistrationContext)
//!     → group.rs (prefix + subpath, pending definitions)
//!     → RegisteredGroup (complete)
//!     → router.rs (conflict check, merge into DispatchTable)
//!
//! Incoming Request (method, path)
//!     → router.rs (route lookup)
//!     → matcher.rs (pattern match, bind params)
//!     → Return: RouteMatch or None
//! ```
//!
//! # Design Decisions
//! - Routes fixed at composition, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route

pub mod group;
pub mod handler;
pub mod matcher;
pub mod route;
pub mod router;

pub use group::{RegisteredGroup, RegistrationContext, RegistrationError, RouteGroup};
pub use handler::{Handler, HandlerError, HandlerResult, Reply, RequestContext};
pub use matcher::{PathPattern, PatternError};
pub use route::RouteDefinition;
pub use router::{DispatchTable, RouteConflict, RouteMatch};
