//! Schema and contract definitions.
//!
//! Schemas can be assembled with the builder methods or deserialized from
//! JSON-Schema-shaped data (`type`, `properties`, `required`, `items`,
//! `additionalProperties`, `default`). Keywords outside that set are ignored.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error raised while turning plain data into a schema or contract.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("invalid response key `{0}`, expected a status such as 200 or a class such as 2xx")]
    InvalidResponseKey(String),
}

/// Primitive and aggregate types a schema can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl SchemaType {
    /// Returns true if `value` is of this type.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (SchemaType::String, Value::String(_)) => true,
            (SchemaType::Number, Value::Number(_)) => true,
            (SchemaType::Integer, Value::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            (SchemaType::Boolean, Value::Bool(_)) => true,
            (SchemaType::Object, Value::Object(_)) => true,
            (SchemaType::Array, Value::Array(_)) => true,
            (SchemaType::Null, Value::Null) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::Null => "null",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative shape of a single value.
///
/// A schema without a `type` accepts any value. Object schemas are
/// non-strict unless [`Schema::strict`] is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub(crate) kind: Option<SchemaType>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) properties: BTreeMap<String, Schema>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) required: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) items: Option<Box<Schema>>,

    #[serde(default = "allow_additional", skip_serializing_if = "is_true")]
    pub(crate) additional_properties: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) default: Option<Value>,
}

fn allow_additional() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            kind: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
            items: None,
            additional_properties: true,
            default: None,
        }
    }
}

impl Schema {
    /// A schema that accepts any value.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn of(kind: SchemaType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    pub fn integer() -> Self {
        Self::of(SchemaType::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaType::Boolean)
    }

    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    /// An array whose items are unconstrained.
    pub fn array() -> Self {
        Self::of(SchemaType::Array)
    }

    pub fn array_of(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    /// Declare (or replace) a property schema.
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Mark a property as required. Requiring the same name twice is a no-op.
    pub fn require(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Declare a property and mark it required.
    pub fn required_property(self, name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        self.property(name.clone(), schema).require(name)
    }

    /// Reject properties that are not declared.
    pub fn strict(mut self) -> Self {
        self.additional_properties = false;
        self
    }

    /// Value filled in by request preparation when the property is absent.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Interpret JSON-Schema-shaped data.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn kind(&self) -> Option<SchemaType> {
        self.kind
    }

    pub fn property_schema(&self, name: &str) -> Option<&Schema> {
        self.properties.get(name)
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    pub fn items(&self) -> Option<&Schema> {
        self.items.as_deref()
    }

    pub fn allows_additional(&self) -> bool {
        self.additional_properties
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// The request part (or response) a schema applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Part {
    #[serde(rename = "params")]
    Params,
    #[serde(rename = "querystring")]
    Query,
    #[serde(rename = "body")]
    Body,
    #[serde(rename = "response")]
    Response,
}

impl Part {
    pub fn as_str(self) -> &'static str {
        match self {
            Part::Params => "params",
            Part::Query => "querystring",
            Part::Body => "body",
            Part::Response => "response",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a response schema: an exact status or a status class (`2xx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResponseKey {
    Status(u16),
    Class(u8),
}

impl ResponseKey {
    pub fn class(class: u8) -> Self {
        ResponseKey::Class(class)
    }
}

impl From<u16> for ResponseKey {
    fn from(status: u16) -> Self {
        ResponseKey::Status(status)
    }
}

impl FromStr for ResponseKey {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidResponseKey(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        if let Some(class) = lower.strip_suffix("xx") {
            return match class.parse::<u8>() {
                Ok(c @ 1..=5) => Ok(ResponseKey::Class(c)),
                _ => Err(invalid()),
            };
        }
        match lower.parse::<u16>() {
            Ok(status @ 100..=599) => Ok(ResponseKey::Status(status)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseKey::Status(status) => write!(f, "{status}"),
            ResponseKey::Class(class) => write!(f, "{class}xx"),
        }
    }
}

/// Schemas for every part of one route.
///
/// Parts without a schema are not validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaContract {
    params: Option<Schema>,
    query: Option<Schema>,
    body: Option<Schema>,
    responses: BTreeMap<ResponseKey, Schema>,
}

#[derive(Deserialize)]
struct RawContract {
    #[serde(default)]
    params: Option<Schema>,
    #[serde(default, alias = "query")]
    querystring: Option<Schema>,
    #[serde(default)]
    body: Option<Schema>,
    #[serde(default)]
    response: BTreeMap<String, Schema>,
}

impl SchemaContract {
    /// An empty contract: nothing is validated.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, schema: Schema) -> Self {
        self.params = Some(schema);
        self
    }

    pub fn query(mut self, schema: Schema) -> Self {
        self.query = Some(schema);
        self
    }

    pub fn body(mut self, schema: Schema) -> Self {
        self.body = Some(schema);
        self
    }

    pub fn response(mut self, key: impl Into<ResponseKey>, schema: Schema) -> Self {
        self.responses.insert(key.into(), schema);
        self
    }

    /// Build a contract from `{params, querystring, body, response: {"200": ..}}` data.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let raw: RawContract = serde_json::from_value(value)?;
        let mut responses = BTreeMap::new();
        for (key, schema) in raw.response {
            responses.insert(key.parse::<ResponseKey>()?, schema);
        }
        Ok(Self {
            params: raw.params,
            query: raw.querystring,
            body: raw.body,
            responses,
        })
    }

    /// Schema declared for an inbound part.
    pub fn schema_for(&self, part: Part) -> Option<&Schema> {
        match part {
            Part::Params => self.params.as_ref(),
            Part::Query => self.query.as_ref(),
            Part::Body => self.body.as_ref(),
            Part::Response => None,
        }
    }

    /// Response schema for a status; an exact key wins over a class key.
    pub fn response_for(&self, status: u16) -> Option<&Schema> {
        self.responses
            .get(&ResponseKey::Status(status))
            .or_else(|| self.responses.get(&ResponseKey::Class((status / 100) as u8)))
    }
}
