//! Request preparation ahead of validation.
//!
//! # Responsibilities
//! - Fill absent properties that declare a `default` (every request part)
//! - Coerce string values from the path and query string to the declared
//!   scalar type, and wrap single values where an array is declared
//!
//! # Design Decisions
//! - Coercion only happens when the string parses cleanly; anything else is
//!   left untouched so validation reports it
//! - Bodies are never coerced: JSON already carries types

use serde_json::{Map, Number, Value};

use crate::schema::types::{Part, Schema, SchemaType};

/// Prepare a raw request part for validation against `schema`.
pub fn prepare(part: Part, mut value: Value, schema: &Schema) -> Value {
    apply_defaults(&mut value, schema);
    match part {
        Part::Params | Part::Query => coerce(value, schema),
        Part::Body | Part::Response => value,
    }
}

fn apply_defaults(value: &mut Value, schema: &Schema) {
    match value {
        Value::Object(map) => fill_object(map, schema),
        Value::Array(items) => {
            if let Some(item_schema) = schema.items.as_deref() {
                for item in items {
                    apply_defaults(item, item_schema);
                }
            }
        }
        _ => {}
    }
}

fn fill_object(map: &mut Map<String, Value>, schema: &Schema) {
    for (name, property) in &schema.properties {
        match map.get_mut(name) {
            Some(field) => apply_defaults(field, property),
            None => {
                if let Some(default) = &property.default {
                    map.insert(name.clone(), default.clone());
                }
            }
        }
    }
}

fn coerce(value: Value, schema: &Schema) -> Value {
    match schema.kind {
        Some(SchemaType::Array) => {
            let items = match value {
                Value::Array(items) => items,
                single => vec![single],
            };
            let items = match schema.items.as_deref() {
                Some(item_schema) => items
                    .into_iter()
                    .map(|item| coerce(item, item_schema))
                    .collect(),
                None => items,
            };
            Value::Array(items)
        }
        Some(SchemaType::Object) | None => match value {
            Value::Object(mut map) => {
                for (name, property) in &schema.properties {
                    if let Some(field) = map.get_mut(name) {
                        *field = coerce(field.take(), property);
                    }
                }
                Value::Object(map)
            }
            other => other,
        },
        Some(kind) => coerce_scalar(value, kind),
    }
}

fn coerce_scalar(value: Value, kind: SchemaType) -> Value {
    let Value::String(text) = value else {
        return value;
    };

    let coerced = match kind {
        SchemaType::Number => parse_number(&text),
        SchemaType::Integer => parse_integer(&text),
        SchemaType::Boolean => match text.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        SchemaType::Null if text.is_empty() => Some(Value::Null),
        _ => None,
    };
    coerced.unwrap_or(Value::String(text))
}

fn parse_integer(text: &str) -> Option<Value> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::from(n));
    }
    text.parse::<u64>().ok().map(Value::from)
}

fn parse_number(text: &str) -> Option<Value> {
    if text.trim() != text || text.is_empty() {
        return None;
    }
    parse_integer(text).or_else(|| {
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_strings_coerced_to_declared_types() {
        let schema = Schema::object()
            .property("page", Schema::integer())
            .property("ratio", Schema::number())
            .property("draft", Schema::boolean())
            .property("name", Schema::string());
        let raw = json!({ "page": "2", "ratio": "0.5", "draft": "false", "name": "42" });

        assert_eq!(
            prepare(Part::Query, raw, &schema),
            json!({ "page": 2, "ratio": 0.5, "draft": false, "name": "42" })
        );
    }

    #[test]
    fn test_unparseable_strings_left_alone() {
        let schema = Schema::object()
            .property("page", Schema::integer())
            .property("ratio", Schema::number());
        let raw = json!({ "page": "two", "ratio": "NaN" });

        assert_eq!(prepare(Part::Query, raw.clone(), &schema), raw);
    }

    #[test]
    fn test_single_value_wrapped_for_array() {
        let schema = Schema::object().property("tag", Schema::array_of(Schema::integer()));

        assert_eq!(
            prepare(Part::Query, json!({ "tag": "7" }), &schema),
            json!({ "tag": [7] })
        );
        assert_eq!(
            prepare(Part::Query, json!({ "tag": ["1", "2"] }), &schema),
            json!({ "tag": [1, 2] })
        );
    }

    #[test]
    fn test_body_is_not_coerced() {
        let schema = Schema::object().property("count", Schema::integer());
        let raw = json!({ "count": "3" });
        assert_eq!(prepare(Part::Body, raw.clone(), &schema), raw);
    }

    #[test]
    fn test_defaults_filled_in_nested_objects() {
        let schema = Schema::object()
            .property("limit", Schema::integer().with_default(json!(10)))
            .property(
                "book",
                Schema::object().property(
                    "author",
                    Schema::string().with_default(json!("anonymous")),
                ),
            );

        assert_eq!(
            prepare(Part::Body, json!({ "book": {} }), &schema),
            json!({ "limit": 10, "book": { "author": "anonymous" } })
        );
    }

    #[test]
    fn test_defaults_do_not_override_supplied_values() {
        let schema = Schema::object().property("limit", Schema::integer().with_default(json!(10)));
        assert_eq!(
            prepare(Part::Query, json!({ "limit": "25" }), &schema),
            json!({ "limit": 25 })
        );
    }
}
