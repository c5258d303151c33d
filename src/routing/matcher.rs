//! Path pattern parsing and matching.
//!
//! # Responsibilities
//! - Parse templates such as `/greetings/hello/:name`
//! - Match concrete request paths and bind named segments
//! - Provide a shape for conflict detection and a rank for precedence
//!
//! # Design Decisions
//! - Static segments are compared case-sensitively against the raw path
//! - Bound values are percent-decoded
//! - A trailing slash is a literal empty last segment: `/books/` != `/books`
//! - No regex; matching is a single pass over the segments

use std::fmt;

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a template was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("path must start with '/'")]
    MissingLeadingSlash,

    #[error("empty segment before position {0}")]
    EmptySegment(usize),

    #[error("parameter at segment {0} has no name")]
    EmptyParamName(usize),

    #[error("parameter `{0}` is bound more than once")]
    DuplicateParam(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a template. Segments starting with `:` bind a parameter.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let rest = raw.strip_prefix('/').ok_or(PatternError::MissingLeadingSlash)?;
        let parts: Vec<&str> = rest.split('/').collect();
        let last = parts.len() - 1;

        let mut segments = Vec::with_capacity(parts.len());
        let mut names: Vec<&str> = Vec::new();
        for (index, part) in parts.iter().enumerate() {
            if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(PatternError::EmptyParamName(index));
                }
                if names.contains(&name) {
                    return Err(PatternError::DuplicateParam(name.to_string()));
                }
                names.push(name);
                segments.push(Segment::Param(name.to_string()));
            } else {
                if part.is_empty() && index != last {
                    return Err(PatternError::EmptySegment(index));
                }
                segments.push(Segment::Static(part.to_string()));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The template with parameter names erased.
    ///
    /// Two patterns with the same shape match exactly the same paths.
    pub fn shape(&self) -> String {
        let mut shape = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            shape.push('/');
            match segment {
                Segment::Static(s) => shape.push_str(s),
                Segment::Param(_) => shape.push(':'),
            }
        }
        shape
    }

    /// Precedence key; lower ranks win. Static segments beat parameters
    /// at the first position where two patterns differ.
    pub(crate) fn rank(&self) -> Vec<u8> {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Static(_) => 0,
                Segment::Param(_) => 1,
            })
            .collect()
    }

    /// Match a concrete path, returning the bound parameters.
    pub fn matches(&self, path: &str) -> Option<Map<String, Value>> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Map::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) => {
                    if expected != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    let decoded = percent_decode_str(part).decode_utf8_lossy().into_owned();
                    params.insert(name.clone(), Value::String(decoded));
                }
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_segment_binds() {
        let pattern = PathPattern::parse("/greetings/hello/:name").unwrap();
        let params = pattern.matches("/greetings/hello/Ada").unwrap();
        assert_eq!(Value::Object(params), json!({ "name": "Ada" }));

        assert!(pattern.matches("/greetings/hello").is_none());
        assert!(pattern.matches("/greetings/hello/").is_none());
        assert!(pattern.matches("/greetings/hello/Ada/extra").is_none());
    }

    #[test]
    fn test_bound_values_are_percent_decoded() {
        let pattern = PathPattern::parse("/hello/:name").unwrap();
        let params = pattern.matches("/hello/Ada%20Byron").unwrap();
        assert_eq!(params["name"], "Ada Byron");
    }

    #[test]
    fn test_static_match_is_case_sensitive() {
        let pattern = PathPattern::parse("/greetings/work").unwrap();
        assert!(pattern.matches("/greetings/work").is_some());
        assert!(pattern.matches("/Greetings/work").is_none());
    }

    #[test]
    fn test_trailing_slash_is_literal() {
        let root = PathPattern::parse("/").unwrap();
        assert!(root.matches("/").is_some());

        let books = PathPattern::parse("/books/").unwrap();
        assert!(books.matches("/books/").is_some());
        assert!(books.matches("/books").is_none());
    }

    #[test]
    fn test_invalid_templates() {
        assert_eq!(PathPattern::parse("books"), Err(PatternError::MissingLeadingSlash));
        assert_eq!(PathPattern::parse("/a//b"), Err(PatternError::EmptySegment(1)));
        assert_eq!(PathPattern::parse("/a/:"), Err(PatternError::EmptyParamName(1)));
        assert_eq!(
            PathPattern::parse("/:id/x/:id"),
            Err(PatternError::DuplicateParam("id".into()))
        );
    }

    #[test]
    fn test_shape_erases_param_names() {
        let a = PathPattern::parse("/hello/:name").unwrap();
        let b = PathPattern::parse("/hello/:who").unwrap();
        assert_eq!(a.shape(), b.shape());
        assert_eq!(a.shape(), "/hello/:");
        assert_ne!(a.shape(), PathPattern::parse("/hello/name").unwrap().shape());
    }

    #[test]
    fn test_static_outranks_param() {
        let fixed = PathPattern::parse("/greetings/work").unwrap();
        let bound = PathPattern::parse("/greetings/:what").unwrap();
        assert!(fixed.rank() < bound.rank());
    }
}
