//! Routes mounted at the application root.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::api::schemas::message_contract;
use crate::routing::{
    HandlerResult, RegistrationContext, RegistrationError, Reply, RequestContext, RouteGroup,
};
use crate::schema::SchemaContract;

/// `GET /` and `GET /hello/:name`.
pub struct RootRoutes;

#[derive(Deserialize)]
struct HelloParams {
    name: String,
}

#[derive(Deserialize)]
struct HelloQuery {
    lastname: String,
}

#[async_trait]
impl RouteGroup for RootRoutes {
    fn name(&self) -> &str {
        "root"
    }

    async fn register(&self, ctx: &mut RegistrationContext) -> Result<(), RegistrationError> {
        ctx.get("/", message_contract(), hello_world)?;

        let hello = SchemaContract::from_value(json!({
            "querystring": {
                "properties": { "lastname": { "type": "string" } },
                "required": ["lastname"]
            },
            "params": {
                "properties": { "name": { "type": "string" } },
                "required": ["name"]
            },
            "response": {
                "200": {
                    "properties": { "message": { "type": "string" } },
                    "required": ["message"]
                }
            }
        }))?;
        ctx.get("/hello/:name", hello, hello_full_name)?;
        Ok(())
    }
}

async fn hello_world(_ctx: RequestContext) -> HandlerResult {
    Ok(Reply::json(json!({ "message": "Hello World!" })))
}

async fn hello_full_name(ctx: RequestContext) -> HandlerResult {
    let HelloParams { name } = ctx.params_as()?;
    let HelloQuery { lastname } = ctx.query_as()?;
    Ok(Reply::json(json!({ "message": format!("Hello {name}, {lastname}") })))
}
