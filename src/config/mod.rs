//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), chosen with --config
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → read once at startup by composition and transport
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ApiConfig, DatabaseBackend, DatabaseConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    SecurityConfig, ServiceConfig, TimeoutConfig,
};
pub use validation::ValidationError;
