//! Generic schema validation.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::schema::types::{Part, Schema, SchemaType};

/// What the schema demanded at a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// The field is required but absent.
    Required,
    /// The field must have this type.
    Type(SchemaType),
    /// The field is not declared and the schema is strict.
    Undeclared,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Required => f.write_str("required"),
            Expected::Type(kind) => f.write_str(kind.as_str()),
            Expected::Undeclared => f.write_str("undeclared"),
        }
    }
}

impl Serialize for Expected {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Observed type of the offending value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActualType {
    Missing,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ActualType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ActualType::Null,
            Value::Bool(_) => ActualType::Boolean,
            Value::Number(_) => ActualType::Number,
            Value::String(_) => ActualType::String,
            Value::Array(_) => ActualType::Array,
            Value::Object(_) => ActualType::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActualType::Missing => "missing",
            ActualType::Null => "null",
            ActualType::Boolean => "boolean",
            ActualType::Number => "number",
            ActualType::String => "string",
            ActualType::Array => "array",
            ActualType::Object => "object",
        }
    }
}

/// One field that failed its schema.
///
/// `path` is dotted for object members and bracketed for array items
/// (`book.title`, `books[2]`). The empty path is the part itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub path: String,
    pub expected: Expected,
    pub actual: ActualType,
}

impl FieldViolation {
    /// Human-readable description, prefixed by the part it was found in.
    pub fn describe(&self, part: Part) -> String {
        match self.expected {
            Expected::Required => format!("{part} must have required property '{}'", self.path),
            Expected::Type(kind) if self.path.is_empty() => format!("{part} must be {kind}"),
            Expected::Type(kind) => format!("{part}.{} must be {kind}", self.path),
            Expected::Undeclared => format!("{part} must not have property '{}'", self.path),
        }
    }
}

/// Check `value` against `schema`.
///
/// Returns every violation found. A type mismatch stops descent into that
/// value, so each missing field or mismatch yields exactly one violation.
pub fn validate(value: &Value, schema: &Schema) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Vec::new();
    check(value, schema, "", &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check(value: &Value, schema: &Schema, path: &str, out: &mut Vec<FieldViolation>) {
    if let Some(kind) = schema.kind {
        if !kind.accepts(value) {
            out.push(FieldViolation {
                path: path.to_string(),
                expected: Expected::Type(kind),
                actual: ActualType::of(value),
            });
            return;
        }
    }

    match value {
        Value::Object(map) => {
            for name in &schema.required {
                if !map.contains_key(name) {
                    out.push(FieldViolation {
                        path: member(path, name),
                        expected: Expected::Required,
                        actual: ActualType::Missing,
                    });
                }
            }
            for (name, property) in &schema.properties {
                if let Some(field) = map.get(name) {
                    check(field, property, &member(path, name), out);
                }
            }
            if !schema.additional_properties {
                for (name, field) in map {
                    if !schema.properties.contains_key(name) {
                        out.push(FieldViolation {
                            path: member(path, name),
                            expected: Expected::Undeclared,
                            actual: ActualType::of(field),
                        });
                    }
                }
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = schema.items.as_deref() {
                for (index, item) in items.iter().enumerate() {
                    check(item, item_schema, &format!("{path}[{index}]"), out);
                }
            }
        }
        _ => {}
    }
}

fn member(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}
