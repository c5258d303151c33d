//! Schema contract subsystem.
//!
//! # Data Flow
//! ```text
//! Route declaration:
//!     builder calls or JSON-shaped data
//!     → types.rs (Schema, SchemaContract)
//!     → attached to a RouteDefinition, immutable afterwards
//!
//! Per request:
//!     raw params / query / body
//!     → coerce.rs (defaults, string coercion for params + query)
//!     → validate.rs (violations or ok)
//!     → handler
//!     → validate.rs against the response schema for the emitted status
//! ```
//!
//! # Design Decisions
//! - Schemas are interpreted data, one generic `validate` walks them
//! - Non-strict by default: unknown fields pass unless a schema opts into strict mode
//! - One violation per missing field or type mismatch, no descent below a mismatch
//! - Validation is pure; coercion returns a new value

pub mod coerce;
pub mod types;
pub mod validate;

pub use coerce::prepare;
pub use types::{Part, ResponseKey, Schema, SchemaContract, SchemaError, SchemaType};
pub use validate::{validate, ActualType, Expected, FieldViolation};
