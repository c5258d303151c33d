//! Handler traits and request/reply types.

use std::future::Future;
use std::sync::Arc;

use axum::http::StatusCode;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::data::{DataAccess, DataAccessError};
use crate::schema::Part;

/// Failure reported by a handler.
///
/// This is the error half of the tagged handler result; the dispatcher maps
/// it to a structured error response.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),

    #[error("could not read validated {part}: {source}")]
    Decode {
        part: Part,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode reply: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result type returned by every handler.
pub type HandlerResult = Result<Reply, HandlerError>;

/// A successful handler outcome: status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    body: Value,
}

impl Reply {
    /// A 200 reply.
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// A 200 reply from any serializable value.
    pub fn serialize<T: Serialize>(body: &T) -> Result<Self, HandlerError> {
        let body = serde_json::to_value(body).map_err(HandlerError::Encode)?;
        Ok(Self::json(body))
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

/// Validated request parts handed to a handler.
#[derive(Clone)]
pub struct RequestContext {
    params: Map<String, Value>,
    query: Map<String, Value>,
    body: Value,
    data: Arc<dyn DataAccess>,
}

impl RequestContext {
    pub(crate) fn new(
        params: Map<String, Value>,
        query: Map<String, Value>,
        body: Value,
        data: Arc<dyn DataAccess>,
    ) -> Self {
        Self {
            params,
            query,
            body,
            data,
        }
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Storage capability for this request.
    pub fn data(&self) -> &dyn DataAccess {
        self.data.as_ref()
    }

    /// A path parameter rendered as text.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        decode(Part::Params, Value::Object(self.params.clone()))
    }

    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        decode(Part::Query, Value::Object(self.query.clone()))
    }

    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        decode(Part::Body, self.body.clone())
    }
}

fn decode<T: DeserializeOwned>(part: Part, value: Value) -> Result<T, HandlerError> {
    serde_json::from_value(value).map_err(|source| HandlerError::Decode { part, source })
}

/// A route handler.
///
/// Implemented for any `Fn(RequestContext) -> impl Future<Output = HandlerResult>`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult> {
        Box::pin((self)(ctx))
    }
}

/// Type-erased handler stored in route definitions.
pub(crate) type BoxedHandler = Arc<dyn Handler>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryDataAccess;
    use serde::Deserialize;
    use serde_json::json;

    fn context(params: Value, query: Value, body: Value) -> RequestContext {
        let as_map = |v: Value| match v {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        RequestContext::new(
            as_map(params),
            as_map(query),
            body,
            Arc::new(MemoryDataAccess::new()),
        )
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Greeting {
        name: String,
    }

    #[test]
    fn test_typed_access() {
        let ctx = context(json!({ "name": "Ada" }), json!({ "page": 2 }), json!(null));

        assert_eq!(ctx.param("name"), Some("Ada"));
        assert_eq!(ctx.params_as::<Greeting>().unwrap(), Greeting { name: "Ada".into() });
        assert_eq!(ctx.query()["page"], 2);
    }

    #[test]
    fn test_decode_failure_names_part() {
        let ctx = context(json!({}), json!({}), json!({ "title": 1 }));
        let err = ctx.body_as::<Greeting>().unwrap_err();
        assert!(matches!(err, HandlerError::Decode { part: Part::Body, .. }));
    }

    #[test]
    fn test_reply_defaults_to_ok() {
        let reply = Reply::json(json!({ "status": 200 }));
        assert_eq!(reply.status(), StatusCode::OK);

        let created = reply.with_status(StatusCode::CREATED);
        assert_eq!(created.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_async_fn_is_a_handler() {
        async fn hello(ctx: RequestContext) -> HandlerResult {
            let name = ctx.param("name").unwrap_or("stranger").to_string();
            Ok(Reply::json(json!({ "message": format!("Hello {name}") })))
        }

        let handler: BoxedHandler = Arc::new(hello);
        let reply = handler
            .call(context(json!({ "name": "Ada" }), json!({}), json!(null)))
            .await
            .unwrap();
        assert_eq!(reply.body(), &json!({ "message": "Hello Ada" }));
    }
}
