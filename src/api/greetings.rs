//! Greeting routes, mounted under `/greetings`.

use async_trait::async_trait;
use serde_json::json;

use crate::api::schemas::message_contract;
use crate::routing::{
    HandlerResult, RegistrationContext, RegistrationError, Reply, RequestContext, RouteGroup,
};

pub struct GreetingsRoutes;

#[async_trait]
impl RouteGroup for GreetingsRoutes {
    fn name(&self) -> &str {
        "greetings"
    }

    async fn register(&self, ctx: &mut RegistrationContext) -> Result<(), RegistrationError> {
        ctx.get("/work", message_contract(), work)?;
        ctx.get("/hello/:name", message_contract(), hello)?;
        Ok(())
    }
}

async fn work(_ctx: RequestContext) -> HandlerResult {
    Ok(Reply::json(json!({
        "message": "Hello World from greetings controller!"
    })))
}

async fn hello(ctx: RequestContext) -> HandlerResult {
    let name = ctx.param("name").unwrap_or_default();
    Ok(Reply::json(json!({
        "message": format!("Hello {name} from greetings controller!")
    })))
}
