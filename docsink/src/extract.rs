//! Path expressions addressing locations inside nested records.
//!
//! A path expression selects zero, one or many values from a record using
//! dotted field access (`a.b.c`), array indexing (`items[0].name`) and the
//! wildcard form (`items[*].name`, or a bare `*` over an object). Evaluation
//! never fails on malformed records; a malformed expression is a
//! configuration error reported by [`PathExpr::parse`].

use serde_json::Value;

use crate::error::{ErrorKind, SinkResult};
use crate::types::Document;
use crate::{bail, sink_error};

/// One step of a parsed path expression.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Named field access on an object.
    Field(String),
    /// Positional access on an array.
    Index(usize),
    /// All values of an object or all elements of an array.
    Wildcard,
}

/// A parsed path expression.
#[derive(Debug, Clone)]
pub struct PathExpr {
    raw: String,
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Parses a path expression.
    ///
    /// An optional leading `$.` (or bare `$`) is accepted and ignored.
    /// Returns an error for empty expressions, empty segments, unclosed
    /// brackets and non-numeric array indices.
    pub fn parse(expr: &str) -> SinkResult<Self> {
        let trimmed = expr
            .strip_prefix("$.")
            .or_else(|| expr.strip_prefix('$'))
            .unwrap_or(expr);

        if trimmed.is_empty() {
            bail!(
                ErrorKind::ConfigError,
                "Path expression must not be empty",
                expr
            );
        }

        let mut segments = Vec::new();
        let mut chars = trimmed.char_indices().peekable();
        let mut field = String::new();

        while let Some((_, ch)) = chars.next() {
            match ch {
                '.' => {
                    if field.is_empty() {
                        bail!(
                            ErrorKind::ConfigError,
                            "Path expression contains an empty segment",
                            expr
                        );
                    }
                    segments.push(take_field(&mut field));
                }
                '[' => {
                    if !field.is_empty() {
                        segments.push(take_field(&mut field));
                    }
                    let mut inner = String::new();
                    let mut closed = false;
                    for (_, inner_ch) in chars.by_ref() {
                        if inner_ch == ']' {
                            closed = true;
                            break;
                        }
                        inner.push(inner_ch);
                    }
                    if !closed {
                        bail!(
                            ErrorKind::ConfigError,
                            "Path expression has an unclosed bracket",
                            expr
                        );
                    }
                    if inner == "*" {
                        segments.push(Segment::Wildcard);
                    } else {
                        let index = inner.parse::<usize>().map_err(|err| {
                            sink_error!(
                                ErrorKind::ConfigError,
                                "Path expression has a non-numeric array index",
                                expr,
                                source: err
                            )
                        })?;
                        segments.push(Segment::Index(index));
                    }
                    // A dot after the bracket is a separator, not a new empty segment.
                    if let Some((_, '.')) = chars.peek() {
                        chars.next();
                    }
                }
                '*' if field.is_empty() => {
                    segments.push(Segment::Wildcard);
                    if let Some((_, '.')) = chars.peek() {
                        chars.next();
                    }
                }
                _ => field.push(ch),
            }
        }

        if !field.is_empty() {
            segments.push(take_field(&mut field));
        }

        if segments.is_empty() {
            bail!(
                ErrorKind::ConfigError,
                "Path expression selects nothing",
                expr
            );
        }

        Ok(Self {
            raw: expr.to_string(),
            segments,
        })
    }

    /// Returns the original expression string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Evaluates the expression against a record.
    ///
    /// Returns every value the path resolves to, which is empty when the
    /// path does not resolve. Never fails on malformed records.
    pub fn evaluate<'a>(&self, record: &'a Document) -> Vec<&'a Value> {
        let mut current: Vec<&'a Value> = match &self.segments[0] {
            Segment::Field(name) => record.get(name).into_iter().collect(),
            Segment::Wildcard => record.values().collect(),
            Segment::Index(_) => Vec::new(),
        };

        for segment in &self.segments[1..] {
            current = current
                .into_iter()
                .flat_map(|value| step(value, segment))
                .collect();
        }

        current
    }
}

fn take_field(field: &mut String) -> Segment {
    Segment::Field(std::mem::take(field))
}

fn step<'a>(value: &'a Value, segment: &Segment) -> Vec<&'a Value> {
    match (segment, value) {
        (Segment::Field(name), Value::Object(map)) => map.get(name).into_iter().collect(),
        (Segment::Index(index), Value::Array(items)) => items.get(*index).into_iter().collect(),
        (Segment::Wildcard, Value::Object(map)) => map.values().collect(),
        (Segment::Wildcard, Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Document {
        json!({
            "id": 1,
            "created_at": "some tz",
            "some_nesting": { "test": "bar" },
            "some_array": ["biz", "buz"],
            "items": [
                { "name": "a", "qty": 1 },
                { "name": "b", "qty": 2 }
            ]
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_top_level_field() {
        let expr = PathExpr::parse("created_at").unwrap();
        assert_eq!(expr.evaluate(&record()), vec![&json!("some tz")]);
    }

    #[test]
    fn test_nested_field() {
        let expr = PathExpr::parse("some_nesting.test").unwrap();
        assert_eq!(expr.evaluate(&record()), vec![&json!("bar")]);
    }

    #[test]
    fn test_array_index() {
        let expr = PathExpr::parse("some_array[0]").unwrap();
        assert_eq!(expr.evaluate(&record()), vec![&json!("biz")]);
    }

    #[test]
    fn test_index_then_field() {
        let expr = PathExpr::parse("items[1].name").unwrap();
        assert_eq!(expr.evaluate(&record()), vec![&json!("b")]);
    }

    #[test]
    fn test_array_wildcard() {
        let expr = PathExpr::parse("items[*].name").unwrap();
        assert_eq!(expr.evaluate(&record()), vec![&json!("a"), &json!("b")]);
    }

    #[test]
    fn test_leading_dollar_prefix() {
        let expr = PathExpr::parse("$.some_nesting.test").unwrap();
        assert_eq!(expr.evaluate(&record()), vec![&json!("bar")]);
    }

    #[test]
    fn test_missing_path_resolves_to_nothing() {
        let expr = PathExpr::parse("does.not.exist").unwrap();
        assert!(expr.evaluate(&record()).is_empty());
    }

    #[test]
    fn test_index_out_of_bounds_resolves_to_nothing() {
        let expr = PathExpr::parse("some_array[9]").unwrap();
        assert!(expr.evaluate(&record()).is_empty());
    }

    #[test]
    fn test_type_mismatch_resolves_to_nothing() {
        // Indexing into an object and field access on a scalar.
        assert!(
            PathExpr::parse("some_nesting[0]")
                .unwrap()
                .evaluate(&record())
                .is_empty()
        );
        assert!(
            PathExpr::parse("id.sub")
                .unwrap()
                .evaluate(&record())
                .is_empty()
        );
    }

    #[test]
    fn test_malformed_expressions_are_rejected() {
        assert!(PathExpr::parse("").is_err());
        assert!(PathExpr::parse("a..b").is_err());
        assert!(PathExpr::parse("a[").is_err());
        assert!(PathExpr::parse("a[x]").is_err());
    }
}
