//! JSON path expressions used by body redaction rules.
//!
//! Supported syntax: `$`, `.name`, `['name']` / `["name"]`, `[0]`, `[*]` and `.*`.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
    Wildcard,
}

/// Errors produced while parsing a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path must start with '$': {0}")]
    MissingRoot(String),

    #[error("unexpected '{ch}' at offset {offset} in path {path}")]
    Unexpected { path: String, ch: char, offset: usize },

    #[error("unterminated bracket in path {0}")]
    Unterminated(String),

    #[error("empty segment in path {0}")]
    EmptySegment(String),
}

/// A parsed JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parse an expression such as `$.user.ssn` or `$.items[*]['card number']`.
    pub fn parse(expr: &str) -> Result<Self, PathError> {
        let raw = expr.trim();
        let rest = raw
            .strip_prefix('$')
            .ok_or_else(|| PathError::MissingRoot(raw.to_string()))?;

        let chars: Vec<char> = rest.chars().collect();
        let mut segments = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    i += 1;
                    let start = i;
                    while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                        i += 1;
                    }
                    let name: String = chars[start..i].iter().collect();
                    match name.as_str() {
                        "" => return Err(PathError::EmptySegment(raw.to_string())),
                        "*" => segments.push(Segment::Wildcard),
                        _ => segments.push(Segment::Key(name)),
                    }
                }
                '[' => {
                    i += 1;
                    let (segment, next) = parse_bracket(raw, &chars, i)?;
                    segments.push(segment);
                    i = next;
                }
                ch => {
                    return Err(PathError::Unexpected {
                        path: raw.to_string(),
                        ch,
                        // +1 for the stripped '$'
                        offset: i + 1,
                    })
                }
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

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Replace every existing value addressed by this path with `replacement`.
    ///
    /// Returns the number of values replaced; missing paths replace nothing.
    pub fn set(&self, doc: &mut Value, replacement: &Value) -> usize {
        set_at(doc, &self.segments, replacement)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse the inside of `[...]`, starting right after the opening bracket.
/// Returns the segment and the index just past the closing bracket.
fn parse_bracket(raw: &str, chars: &[char], mut i: usize) -> Result<(Segment, usize), PathError> {
    let unterminated = || PathError::Unterminated(raw.to_string());

    if let Some(&quote) = chars.get(i).filter(|c| **c == '\'' || **c == '"') {
        i += 1;
        let start = i;
        while i < chars.len() && chars[i] != quote {
            i += 1;
        }
        if i >= chars.len() {
            return Err(unterminated());
        }
        let name: String = chars[start..i].iter().collect();
        i += 1;
        if chars.get(i) != Some(&']') {
            return Err(unterminated());
        }
        return Ok((Segment::Key(name), i + 1));
    }

    let start = i;
    while i < chars.len() && chars[i] != ']' {
        i += 1;
    }
    if i >= chars.len() {
        return Err(unterminated());
    }
    let inner: String = chars[start..i].iter().collect();
    let inner = inner.trim();

    let segment = if inner == "*" {
        Segment::Wildcard
    } else if let Ok(index) = inner.parse::<usize>() {
        Segment::Index(index)
    } else if inner.is_empty() {
        return Err(PathError::EmptySegment(raw.to_string()));
    } else {
        return Err(PathError::Unexpected {
            path: raw.to_string(),
            ch: inner.chars().next().unwrap_or('['),
            offset: start + 1,
        });
    };

    Ok((segment, i + 1))
}

fn set_at(node: &mut Value, segments: &[Segment], replacement: &Value) -> usize {
    let Some((head, tail)) = segments.split_first() else {
        *node = replacement.clone();
        return 1;
    };

    match (head, node) {
        (Segment::Key(key), Value::Object(map)) => map
            .get_mut(key)
            .map_or(0, |child| set_at(child, tail, replacement)),
        (Segment::Index(index), Value::Array(items)) => items
            .get_mut(*index)
            .map_or(0, |child| set_at(child, tail, replacement)),
        (Segment::Wildcard, Value::Object(map)) => map
            .values_mut()
            .map(|child| set_at(child, tail, replacement))
            .sum(),
        (Segment::Wildcard, Value::Array(items)) => items
            .iter_mut()
            .map(|child| set_at(child, tail, replacement))
            .sum(),
        _ => 0,
    }
}
