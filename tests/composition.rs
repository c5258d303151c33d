//! Route group composition: conflicts, failing and stalled groups.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::Method;
use serde_json::json;

use bookshelf::api::{BooksRoutes, GreetingsRoutes, RootRoutes};
use bookshelf::app::{App, ComposeError};
use bookshelf::data::memory::MemoryDataAccess;
use bookshelf::data::DataAccessError;
use bookshelf::routing::{
    HandlerResult, RegistrationContext, RegistrationError, Reply, RequestContext, RouteGroup,
};
use bookshelf::schema::SchemaContract;
use bookshelf::DispatchRequest;

mod common;

async fn echo(_ctx: RequestContext) -> HandlerResult {
    Ok(Reply::json(json!({ "message": "echo" })))
}

/// Defines one GET route per path.
struct Fixed(&'static str, Vec<&'static str>);

#[async_trait]
impl RouteGroup for Fixed {
    fn name(&self) -> &str {
        self.0
    }

    async fn register(&self, ctx: &mut RegistrationContext) -> Result<(), RegistrationError> {
        for path in &self.1 {
            ctx.get(path, SchemaContract::new(), echo)?;
        }
        Ok(())
    }
}

/// Defines a route, then fails.
struct Failing;

#[async_trait]
impl RouteGroup for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    async fn register(&self, ctx: &mut RegistrationContext) -> Result<(), RegistrationError> {
        ctx.get("/leaked", SchemaContract::new(), echo)?;
        Err(RegistrationError::Unavailable("catalog table missing".into()))
    }
}

/// Probes storage before exposing anything.
struct Probing;

#[async_trait]
impl RouteGroup for Probing {
    fn name(&self) -> &str {
        "probing"
    }

    async fn register(&self, ctx: &mut RegistrationContext) -> Result<(), RegistrationError> {
        ctx.data().query("select 1", &[]).await?;
        ctx.get("/", SchemaContract::new(), echo)?;
        Ok(())
    }
}

/// Never signals completion.
struct Stalled;

#[async_trait]
impl RouteGroup for Stalled {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn register(&self, _ctx: &mut RegistrationContext) -> Result<(), RegistrationError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

fn builder() -> bookshelf::AppBuilder {
    App::builder(Arc::new(MemoryDataAccess::new()))
}

#[tokio::test]
async fn test_service_routes_are_unique() {
    let app = common::service_app(&Arc::new(MemoryDataAccess::new())).await;

    let mut labels: Vec<String> = app.routes().map(|r| r.label()).collect();
    labels.sort();
    assert_eq!(
        labels,
        [
            "GET /",
            "GET /books",
            "GET /books/",
            "GET /greetings/hello/:name",
            "GET /greetings/work",
            "GET /hello/:name",
            "POST /books",
            "POST /books/",
        ]
    );
}

#[tokio::test]
async fn test_colliding_mounts_fail_naming_both_definitions() {
    let err = builder()
        .mount("/greetings", GreetingsRoutes)
        .await
        .unwrap()
        .mount("", Fixed("extra", vec!["/greetings/hello/:who"]))
        .await
        .unwrap_err();

    match err {
        ComposeError::Conflict(conflict) => {
            assert_eq!(conflict.method, Method::GET);
            assert_eq!(conflict.pattern, "/greetings/hello/:who");
            assert_eq!(conflict.incoming_group, "extra");
            assert_eq!(conflict.existing, "GET /greetings/hello/:name");
            assert_eq!(conflict.existing_group, "greetings");
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_collision_is_deterministic() {
    for _ in 0..5 {
        let err = builder()
            .mount("/books", BooksRoutes)
            .await
            .unwrap()
            .mount("/books", BooksRoutes)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "GET /books/ (group `books`) conflicts with GET /books/ (group `books`)"
        );
    }
}

#[tokio::test]
async fn test_bare_prefix_alias_takes_part_in_conflicts() {
    let err = builder()
        .mount("/books", BooksRoutes)
        .await
        .unwrap()
        .mount("", Fixed("shadow", vec!["/books"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ComposeError::Conflict(ref c) if c.existing == "GET /books"));
}

#[tokio::test]
async fn test_failing_group_prevents_readiness() {
    let err = builder()
        .mount("", RootRoutes)
        .await
        .unwrap()
        .mount("/broken", Failing)
        .await
        .unwrap_err();

    match err {
        ComposeError::Registration { group, source } => {
            assert_eq!(group, "failing");
            assert!(matches!(source, RegistrationError::Unavailable(_)));
        }
        other => panic!("expected registration failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_group_can_probe_storage() {
    let app = builder()
        .mount("/probe", Probing)
        .await
        .unwrap()
        .build();
    assert!(app.dispatch(DispatchRequest::get("/probe")).await.is_ok());

    let err = App::builder(Arc::new(
        MemoryDataAccess::new().failing_with(DataAccessError::Timeout),
    ))
    .mount("/probe", Probing)
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        ComposeError::Registration {
            source: RegistrationError::DataAccess(DataAccessError::Timeout),
            ..
        }
    ));
}

#[tokio::test]
async fn test_stalled_group_times_out() {
    let err = builder()
        .registration_timeout(Duration::from_millis(50))
        .mount("/never", Stalled)
        .await
        .unwrap_err();

    match err {
        ComposeError::RegistrationTimedOut { group, timeout } => {
            assert_eq!(group, "stalled");
            assert_eq!(timeout, Duration::from_millis(50));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_mount_point_is_concatenated() {
    let mut config = common::test_config();
    config.api.mount_point = "/api".into();

    let app = bookshelf::api::compose(Arc::new(MemoryDataAccess::new()), &config)
        .await
        .unwrap();

    assert!(app.dispatch(DispatchRequest::get("/api/greetings/work")).await.is_ok());
    assert!(app.dispatch(DispatchRequest::get("/api/books")).await.is_ok());
    assert!(app.dispatch(DispatchRequest::get("/api")).await.is_ok());
    assert!(app.dispatch(DispatchRequest::get("/greetings/work")).await.is_err());
}

#[tokio::test]
async fn test_static_route_beats_parameter_regardless_of_mount_order() {
    let app = builder()
        .mount("/greetings", Fixed("catch-all", vec!["/:anything"]))
        .await
        .unwrap()
        .mount("/greetings", GreetingsRoutes)
        .await
        .unwrap()
        .build();

    let reply = app
        .dispatch(DispatchRequest::get("/greetings/work"))
        .await
        .unwrap();
    assert_eq!(
        reply.body(),
        &json!({ "message": "Hello World from greetings controller!" })
    );

    let reply = app
        .dispatch(DispatchRequest::get("/greetings/other"))
        .await
        .unwrap();
    assert_eq!(reply.body(), &json!({ "message": "echo" }));
}
