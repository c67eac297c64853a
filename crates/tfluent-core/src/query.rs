//! Path queries over JSON documents.
//!
//! The query language is the dot-path subset familiar from gjson:
//!
//! | Path            | Meaning                                                   |
//! |-----------------|-----------------------------------------------------------|
//! | `a.b.c`         | nested object field access                                |
//! | `a.0`           | array index (on an object, `0` is an ordinary key)        |
//! | `a.#`           | array length                                              |
//! | `a.#.b`         | `b` of every element of `a`, collected into an array      |
//! | `a.b*`, `a.?c`  | first key matching the wildcard pattern, document order   |
//! | `a\.b`          | key `a.b`; a backslash escapes the next character         |
//! | `.`, `@this`    | the whole document                                        |
//! | `@reverse`, `@keys`, `@values` | modifiers applied to the current value     |
//!
//! Paths starting with `$` are evaluated as JSONPath instead, so expressions
//! outside the subset above (filters, recursive descent, slices) remain
//! available.
//!
//! A match on an explicit `null` is returned as `null`;
//! [`ValueRef::query`](crate::ValueRef::query) treats it as absent. Paths
//! that do not match, and unknown modifiers, yield no value.

use std::borrow::Cow;

use serde_json::Value;
use thiserror::Error;
use tracing::trace;

/// Errors raised while evaluating a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A `$`-prefixed path is not a valid JSONPath expression.
    #[error("invalid JSONPath expression {path}: {reason}")]
    JsonPath {
        /// The offending path.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// Interprets `value` as a JSON document.
///
/// Strings are parsed as JSON text; any other value already is a document.
///
/// # Errors
///
/// Returns the parse error when `value` is a string that is not valid JSON.
pub fn as_document(value: &Value) -> Result<Cow<'_, Value>, serde_json::Error> {
    match value {
        Value::String(text) => serde_json::from_str(text).map(Cow::Owned),
        other => Ok(Cow::Borrowed(other)),
    }
}

/// Evaluates `path` against `document`, returning the matched value.
///
/// # Errors
///
/// Returns [`QueryError::JsonPath`] when a `$`-prefixed path cannot be parsed.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use tfluent_core::query::select;
///
/// let doc = json!({"tags": {"env": "prod"}, "zones": ["1", "2"]});
/// assert_eq!(select(&doc, "tags.env").unwrap(), Some(json!("prod")));
/// assert_eq!(select(&doc, "zones.#").unwrap(), Some(json!(2)));
/// assert_eq!(select(&doc, "zones.1").unwrap(), Some(json!("2")));
/// assert_eq!(select(&doc, "tags.team").unwrap(), None);
/// ```
pub fn select(document: &Value, path: &str) -> Result<Option<Value>, QueryError> {
    trace!(path, "evaluating query");
    if path.starts_with('$') {
        return select_jsonpath(document, path);
    }
    if path.is_empty() {
        return Ok(None);
    }
    if path == "." {
        return Ok(Some(document.clone()));
    }
    let segments = parse(path);
    Ok(eval(document, &segments))
}

fn select_jsonpath(document: &Value, path: &str) -> Result<Option<Value>, QueryError> {
    let matches = jsonpath_lib::select(document, path).map_err(|e| QueryError::JsonPath {
        path: path.to_string(),
        reason: format!("{e:?}"),
    })?;
    Ok(match matches.as_slice() {
        [] => None,
        [single] => Some((*single).clone()),
        many => Some(Value::Array(many.iter().map(|v| (*v).clone()).collect())),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Char(char),
    /// `*`: any run of characters.
    Star,
    /// `?`: exactly one character.
    Any,
}

/// One dot-separated path component.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    /// Component text with escapes removed.
    text: String,
    tokens: Vec<Token>,
    /// True when no character of the component was escaped.
    plain: bool,
}

impl Segment {
    fn new() -> Self {
        Self {
            text: String::new(),
            tokens: Vec::new(),
            plain: true,
        }
    }

    fn has_wildcard(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, Token::Star | Token::Any))
    }

    fn is_length(&self) -> bool {
        self.plain && self.text == "#"
    }

    fn modifier(&self) -> Option<&str> {
        if self.plain {
            self.text.strip_prefix('@')
        } else {
            None
        }
    }

    fn matches(&self, key: &str) -> bool {
        glob(&self.tokens, &key.chars().collect::<Vec<_>>())
    }
}

fn parse(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Segment::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.text.push(escaped);
                    current.tokens.push(Token::Char(escaped));
                    current.plain = false;
                }
            }
            '.' => segments.push(std::mem::replace(&mut current, Segment::new())),
            '*' => {
                current.text.push(c);
                current.tokens.push(Token::Star);
            }
            '?' => {
                current.text.push(c);
                current.tokens.push(Token::Any);
            }
            _ => {
                current.text.push(c);
                current.tokens.push(Token::Char(c));
            }
        }
    }
    segments.push(current);
    segments
}

fn glob(pattern: &[Token], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((Token::Star, rest)) => (0..=text.len()).any(|skip| glob(rest, &text[skip..])),
        Some((Token::Any, rest)) => !text.is_empty() && glob(rest, &text[1..]),
        Some((Token::Char(c), rest)) => text.first() == Some(c) && glob(rest, &text[1..]),
    }
}

fn eval(value: &Value, segments: &[Segment]) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };

    if head.is_length() {
        let Value::Array(items) = value else {
            return None;
        };
        if rest.is_empty() {
            return Some(Value::from(items.len()));
        }
        return Some(Value::Array(
            items.iter().filter_map(|item| eval(item, rest)).collect(),
        ));
    }

    if let Some(name) = head.modifier() {
        let modified = apply_modifier(name, value)?;
        return eval(&modified, rest);
    }

    match value {
        Value::Object(map) => {
            let child = if head.has_wildcard() {
                map.iter().find(|(key, _)| head.matches(key)).map(|(_, v)| v)
            } else {
                map.get(&head.text)
            };
            eval(child?, rest)
        }
        Value::Array(items) => {
            let index: usize = head.text.parse().ok()?;
            eval(items.get(index)?, rest)
        }
        _ => None,
    }
}

fn apply_modifier(name: &str, value: &Value) -> Option<Value> {
    match (name, value) {
        ("this", v) => Some(v.clone()),
        ("reverse", Value::Array(items)) => Some(Value::Array(items.iter().rev().cloned().collect())),
        ("reverse", Value::Object(map)) => Some(Value::Object(
            map.iter().rev().map(|(k, v)| (k.clone(), v.clone())).collect(),
        )),
        ("reverse", v) => Some(v.clone()),
        ("keys", Value::Object(map)) => Some(Value::Array(
            map.keys().cloned().map(Value::String).collect(),
        )),
        ("values", Value::Object(map)) => Some(Value::Array(map.values().cloned().collect())),
        _ => {
            trace!(modifier = name, "modifier not applicable");
            None
        }
    }
}
