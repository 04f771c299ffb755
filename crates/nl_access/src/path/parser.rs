use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::error::Error;
use core::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

use nl_utils::hash::HashMap;

use crate::path::{NodePath, Segment};

// -----------------------------------------------------------------------------
// PathParseError

/// An error produced when parsing a textual path.
///
/// Carries the full input text and the byte offset of the offending
/// character so tooling can point at the exact position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParseError {
    /// The byte offset into `text` at which parsing failed.
    pub offset: usize,
    /// The full input text.
    pub text: String,
    /// A human-readable description of the failure.
    pub reason: Cow<'static, str>,
}

impl PathParseError {
    fn new(text: &str, offset: usize, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            offset,
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid path {:?} at offset {}: {}",
            self.text, self.offset, self.reason
        )
    }
}

impl Error for PathParseError {}

// -----------------------------------------------------------------------------
// Memoized parsing

/// Returns the memoized parse result for `text`, parsing on first use.
///
/// Only successful parses enter the table; malformed text is re-parsed on
/// each attempt, which keeps the table bounded by the set of valid path
/// literals the program actually uses.
pub(crate) fn parse_cached(text: &str) -> Result<NodePath, PathParseError> {
    static TABLE: OnceLock<RwLock<HashMap<Box<str>, NodePath>>> = OnceLock::new();

    let table = TABLE.get_or_init(Default::default);
    {
        let table = table.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(path) = table.get(text) {
            return Ok(path.clone());
        }
    }

    let path = NodePath::parse_uncached(text)?;
    let mut table = table.write().unwrap_or_else(PoisonError::into_inner);
    table.entry(Box::from(text)).or_insert_with(|| path.clone());
    Ok(path)
}

// -----------------------------------------------------------------------------
// Grammar

/// The parser state between characters.
enum State {
    /// At the start of the path or right after a `.`: a member name must
    /// follow.
    ExpectField { start: usize },
    /// Inside a member name.
    InField { start: usize },
    /// Inside a `[N]` segment, accumulating digits.
    InIndex { start: usize, digits: usize },
    /// Right after a `]`: only `.` or end-of-input may follow.
    AfterIndex,
}

/// Parses `text` into a segment sequence.
///
/// The grammar accepted here is exactly the canonical rendering: member
/// names separated by `.`, each optionally followed by a single `[N]`.
/// Blank input yields the empty sequence (the identity path).
pub(crate) fn parse_segments(text: &str) -> Result<Vec<Segment>, PathParseError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    let mut state = State::ExpectField { start: 0 };

    let push_field = |segments: &mut Vec<Segment>, start: usize, end: usize| {
        segments.push(Segment::Field(Cow::Owned(text[start..end].to_string())));
    };

    for (offset, ch) in text.char_indices() {
        state = match state {
            State::ExpectField { start } => match ch {
                c if c.is_ascii_alphabetic() || c == '_' => State::InField { start },
                '.' => {
                    return Err(PathParseError::new(text, offset, "expected a member name"));
                }
                '[' => {
                    return Err(PathParseError::new(
                        text,
                        offset,
                        "an index segment must follow a member name",
                    ));
                }
                c if c.is_ascii_digit() => {
                    return Err(PathParseError::new(
                        text,
                        offset,
                        "a member name cannot begin with a digit",
                    ));
                }
                _ => {
                    return Err(PathParseError::new(
                        text,
                        offset,
                        "unexpected character in member name",
                    ));
                }
            },
            State::InField { start } => match ch {
                c if c.is_ascii_alphanumeric() || c == '_' => State::InField { start },
                '.' => {
                    push_field(&mut segments, start, offset);
                    State::ExpectField { start: offset + 1 }
                }
                '[' => {
                    push_field(&mut segments, start, offset);
                    State::InIndex {
                        start: offset + 1,
                        digits: 0,
                    }
                }
                _ => {
                    return Err(PathParseError::new(
                        text,
                        offset,
                        "unexpected character in member name",
                    ));
                }
            },
            State::InIndex { start, digits } => match ch {
                c if c.is_ascii_digit() => State::InIndex {
                    start,
                    digits: digits + 1,
                },
                ']' => {
                    if digits == 0 {
                        return Err(PathParseError::new(text, offset, "expected an index"));
                    }
                    let index: usize = text[start..offset].parse().map_err(|_| {
                        PathParseError::new(text, start, "index does not fit in usize")
                    })?;
                    segments.push(Segment::Index(index));
                    State::AfterIndex
                }
                _ => {
                    return Err(PathParseError::new(
                        text,
                        offset,
                        "expected a decimal digit or `]`",
                    ));
                }
            },
            State::AfterIndex => match ch {
                '.' => State::ExpectField { start: offset + 1 },
                '[' => {
                    return Err(PathParseError::new(
                        text,
                        offset,
                        "stacked index segments are not supported",
                    ));
                }
                _ => {
                    return Err(PathParseError::new(
                        text,
                        offset,
                        "expected `.` or end of path after `]`",
                    ));
                }
            },
        };
    }

    match state {
        State::InField { start } => push_field(&mut segments, start, text.len()),
        State::AfterIndex => {}
        State::ExpectField { .. } => {
            return Err(PathParseError::new(
                text,
                text.len(),
                "path cannot end with a separator",
            ));
        }
        State::InIndex { .. } => {
            return Err(PathParseError::new(
                text,
                text.len(),
                "unterminated index segment",
            ));
        }
    }

    Ok(segments)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::parse_segments;
    use crate::path::{NodePath, Segment};
    use alloc::borrow::Cow;

    fn field(name: &'static str) -> Segment {
        Segment::Field(Cow::Borrowed(name))
    }

    #[test]
    fn parses_fields_and_indices() {
        let segments = parse_segments("transform.items[2].value").unwrap();
        assert_eq!(
            segments,
            vec![
                field("transform"),
                field("items"),
                Segment::Index(2),
                field("value"),
            ]
        );
    }

    #[test]
    fn blank_is_identity() {
        assert!(parse_segments("").unwrap().is_empty());
        assert!(parse_segments("  \t").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_paths() {
        for text in [
            ".items",
            "items.",
            "items..value",
            "[0]",
            "items[0][1]",
            "items[]",
            "items[0",
            "items[x]",
            "items[0]value",
            "2items",
            "a b",
        ] {
            assert!(parse_segments(text).is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn error_carries_offset() {
        let err = parse_segments("items[0][1]").unwrap_err();
        assert_eq!(err.offset, 8);
        assert_eq!(err.text, "items[0][1]");
    }

    #[test]
    fn memoized_parse_matches_uncached() {
        let a = NodePath::parse("mem.oized[4]").unwrap();
        let b = NodePath::parse("mem.oized[4]").unwrap();
        let c = NodePath::parse_uncached("mem.oized[4]").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn underscore_names() {
        let segments = parse_segments("_private.x_1").unwrap();
        assert_eq!(segments, vec![field("_private"), field("x_1")]);
    }
}
