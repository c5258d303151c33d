//! Application composition.
//!
//! # Data Flow
//! ```text
//! App::builder(data)
//!     → mount(prefix, group)        (per group, in order)
//!         → RouteGroup::register     (bounded by registration timeout)
//!         → DispatchTable::merge     (conflict check)
//!     → build() → App                (immutable, cheap to clone)
//!
//! App::dispatch(request) → dispatch.rs
//! ```
//!
//! # Design Decisions
//! - An `App` only exists once every mounted group completed; a failed or
//!   stalled group consumes the builder and returns an error instead
//! - The mount point is concatenated with each group prefix, never merged
//! - No global instance; callers own the `App` value

pub mod dispatch;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::data::DataAccess;
use crate::routing::{
    DispatchTable, RegistrationContext, RegistrationError, RouteConflict, RouteDefinition,
    RouteGroup,
};

pub use dispatch::{DispatchError, DispatchRequest};

/// Default bound on how long a group may take to register.
pub const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Why composition stopped.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Conflict(#[from] RouteConflict),

    #[error("route group `{group}` failed to register: {source}")]
    Registration {
        group: String,
        #[source]
        source: RegistrationError,
    },

    #[error("route group `{group}` did not complete registration within {timeout:?}")]
    RegistrationTimedOut { group: String, timeout: Duration },
}

/// A composed, ready-to-dispatch application.
#[derive(Clone)]
pub struct App {
    table: Arc<DispatchTable>,
    data: Arc<dyn DataAccess>,
}

impl App {
    /// Start composing an application whose handlers use `data`.
    pub fn builder(data: Arc<dyn DataAccess>) -> AppBuilder {
        AppBuilder {
            mount_point: String::new(),
            registration_timeout: DEFAULT_REGISTRATION_TIMEOUT,
            table: DispatchTable::new(),
            data,
        }
    }

    /// Every route, in mount order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.table.routes()
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.table.len())
            .finish_non_exhaustive()
    }
}

/// Pending composition. Turns into an [`App`] with [`AppBuilder::build`].
pub struct AppBuilder {
    mount_point: String,
    registration_timeout: Duration,
    table: DispatchTable,
    data: Arc<dyn DataAccess>,
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("mount_point", &self.mount_point)
            .field("routes", &self.table.len())
            .finish_non_exhaustive()
    }
}

impl AppBuilder {
    /// Prefix prepended to every group prefix mounted after this call.
    pub fn mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = mount_point.into();
        self
    }

    pub fn registration_timeout(mut self, timeout: Duration) -> Self {
        self.registration_timeout = timeout;
        self
    }

    /// Register `group` under `prefix` and wait for it to complete.
    pub async fn mount<G: RouteGroup>(
        mut self,
        prefix: &str,
        group: G,
    ) -> Result<Self, ComposeError> {
        let name = group.name().to_string();
        let full_prefix = format!("{}{}", self.mount_point, prefix);
        let mut ctx = RegistrationContext::new(name.clone(), full_prefix, Arc::clone(&self.data));

        match tokio::time::timeout(self.registration_timeout, group.register(&mut ctx)).await {
            Ok(Ok(())) => {}
            Ok(Err(source)) => {
                tracing::error!(group = %name, error = %source, "Route group failed to register");
                return Err(ComposeError::Registration { group: name, source });
            }
            Err(_) => {
                tracing::error!(
                    group = %name,
                    timeout_ms = self.registration_timeout.as_millis() as u64,
                    "Route group did not complete registration"
                );
                return Err(ComposeError::RegistrationTimedOut {
                    group: name,
                    timeout: self.registration_timeout,
                });
            }
        }

        let registered = ctx.finish();
        let routes = registered.definitions().len();
        let prefix = registered.prefix().to_string();
        self.table.merge(registered).inspect_err(|conflict| {
            tracing::error!(error = %conflict, "Route conflict");
        })?;

        tracing::info!(group = %name, prefix = %prefix, routes, "Route group mounted");
        Ok(self)
    }

    /// Freeze the table.
    pub fn build(self) -> App {
        App {
            table: Arc::new(self.table),
            data: self.data,
        }
    }
}
