//! Service routes.
//!
//! # Route Groups
//! - `root` at `""`: `GET /`, `GET /hello/:name`
//! - `greetings` at `/greetings`: `GET /work`, `GET /hello/:name`
//! - `books` at `/books`: `GET /`, `POST /`

pub mod books;
pub mod greetings;
pub mod root;
pub mod schemas;

use std::sync::Arc;
use std::time::Duration;

use crate::app::{App, AppBuilder, ComposeError};
use crate::config::ServiceConfig;
use crate::data::DataAccess;

pub use books::BooksRoutes;
pub use greetings::GreetingsRoutes;
pub use root::RootRoutes;

/// Compose the service's route groups into a ready [`App`].
pub async fn compose(
    data: Arc<dyn DataAccess>,
    config: &ServiceConfig,
) -> Result<App, ComposeError> {
    App::builder(data)
        .mount_point(config.api.mount_point.clone())
        .registration_timeout(Duration::from_secs(config.timeouts.registration_secs))
        .mount("/greetings", GreetingsRoutes)
        .await?
        .mount("/books", BooksRoutes)
        .await?
        .mount("", RootRoutes)
        .await
        .map(AppBuilder::build)
}
