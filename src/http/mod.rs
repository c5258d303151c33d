//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, body limit, query + JSON decoding)
//!     → App::dispatch
//!     → response.rs (reply or structured error body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestError, UuidRequestId, X_REQUEST_ID};
pub use response::ErrorBody;
pub use server::HttpServer;
