//! The parsed, canonical representation of an access path.
//!
//! A [`NodePath`] is an immutable sequence of [`Segment`]s describing a
//! descent from a root node to one of its (possibly deeply nested) values.
//! Paths are written in the product's textual grammar:
//!
//! - member segments are separated by `.`, e.g. `transform.position`
//! - an index segment is a bare `[N]` suffix directly following a member
//!   name, e.g. `items[2]`
//! - the empty string denotes the identity (root) path
//!
//! Stacked brackets (`items[0][1]`) and leading/trailing separators are
//! syntax errors; sequences of sequences are addressed through the
//! delegation protocol instead.
//!
//! Two paths are equal iff their canonical textual renderings are equal, so
//! independently parsed paths are interchangeable as cache keys. Derived
//! paths ([`append`], [`combine`], [`parent`], [`slice`]) always produce new
//! instances.
//!
//! # Examples
//!
//! ```
//! use nl_access::path::{NodePath, Segment};
//!
//! let path = NodePath::parse("items[2].value").unwrap();
//! assert_eq!(path.len(), 3);
//! assert_eq!(path.get(1), Some(&Segment::Index(2)));
//! assert_eq!(path.to_string(), "items[2].value");
//!
//! let parent = path.parent();
//! assert_eq!(parent.to_string(), "items[2]");
//! ```
//!
//! [`append`]: NodePath::append
//! [`combine`]: NodePath::combine
//! [`parent`]: NodePath::parent
//! [`slice`]: NodePath::slice

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;

mod parser;
mod serde;

pub use parser::PathParseError;

// -----------------------------------------------------------------------------
// Segment

/// A **singular** element access within a path.
///
/// A path is a sequence of segments; each segment names either a member of
/// an object shape or a position inside an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// A name-based member access, e.g. the `value` of `items[2].value`.
    Field(Cow<'static, str>),
    /// An index-based access into an ordered sequence,
    /// e.g. the `2` of `items[2]`.
    Index(usize),
}

impl Segment {
    /// Creates a member segment from a name.
    #[inline]
    pub fn field(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Field(name.into())
    }

    /// Returns the member name if this is a [`Field`](Segment::Field) segment.
    #[inline]
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name.as_ref()),
            Self::Index(_) => None,
        }
    }

    /// Returns the position if this is an [`Index`](Segment::Index) segment.
    #[inline]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Field(_) => None,
            Self::Index(index) => Some(*index),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

// -----------------------------------------------------------------------------
// NodePath

/// An immutable, hashable sequence of path segments.
///
/// Internally a shared slice plus its canonical textual rendering; cloning
/// is two reference-count bumps. Equality, ordering and hashing are based on
/// the canonical text, never on structural identity.
///
/// # Examples
///
/// ```
/// use nl_access::path::NodePath;
///
/// let a = NodePath::parse("items[0].value").unwrap();
/// let b = NodePath::parse("items[0]").unwrap().append("value");
///
/// assert_eq!(a, b);
/// assert!(a.starts_with(&NodePath::parse("items[0]").unwrap()));
/// ```
#[derive(Clone)]
pub struct NodePath {
    segments: Arc<[Segment]>,
    text: Arc<str>,
}

impl NodePath {
    /// Returns the identity (root) path: no segments, empty text.
    pub fn identity() -> Self {
        Self::from_segments(Vec::new())
    }

    /// Parses a textual path, memoizing the result by input text.
    ///
    /// Repeated parses of the same literal are O(1) after first use.
    ///
    /// # Errors
    ///
    /// Returns [`PathParseError`] for malformed text; segments are never
    /// silently dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use nl_access::path::NodePath;
    ///
    /// let path = NodePath::parse("items[2]").unwrap();
    /// assert_eq!(path.len(), 2);
    ///
    /// assert!(NodePath::parse("items[0][1]").is_err());
    /// assert!(NodePath::parse(".items").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, PathParseError> {
        parser::parse_cached(text)
    }

    /// Parses a textual path without consulting the memoization table.
    pub fn parse_uncached(text: &str) -> Result<Self, PathParseError> {
        parser::parse_segments(text).map(Self::from_segments)
    }

    /// Builds a path from a segment sequence, computing the canonical text.
    pub fn from_segments(segments: impl Into<Vec<Segment>>) -> Self {
        let segments: Vec<Segment> = segments.into();
        let text = render(&segments);
        Self {
            segments: segments.into(),
            text: text.into(),
        }
    }

    /// Returns the number of segments. The identity path has length zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the identity (root) path.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segment at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Returns the underlying segment slice.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the canonical textual rendering.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns an iterator over the segments.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Returns a new path with a member segment appended.
    ///
    /// # Examples
    ///
    /// ```
    /// use nl_access::path::NodePath;
    ///
    /// let path = NodePath::identity().append("items").append_index(0);
    /// assert_eq!(path.to_string(), "items[0]");
    /// ```
    pub fn append(&self, field: impl Into<Cow<'static, str>>) -> Self {
        let mut segments = self.segments.to_vec();
        segments.push(Segment::Field(field.into()));
        Self::from_segments(segments)
    }

    /// Returns a new path with an index segment appended.
    pub fn append_index(&self, index: usize) -> Self {
        let mut segments = self.segments.to_vec();
        segments.push(Segment::Index(index));
        Self::from_segments(segments)
    }

    /// Returns a new path with a single segment appended.
    pub fn append_segment(&self, segment: Segment) -> Self {
        let mut segments = self.segments.to_vec();
        segments.push(segment);
        Self::from_segments(segments)
    }

    /// Concatenates two paths into a new one.
    ///
    /// `combine` is associative:
    /// `a.combine(&b).combine(&c) == a.combine(&b.combine(&c))`.
    pub fn combine(&self, other: &NodePath) -> Self {
        if other.is_identity() {
            return self.clone();
        }
        if self.is_identity() {
            return other.clone();
        }
        let mut segments = self.segments.to_vec();
        segments.extend_from_slice(&other.segments);
        Self::from_segments(segments)
    }

    /// Returns the path without its last segment.
    ///
    /// The parent of a single-segment or identity path is the identity path.
    pub fn parent(&self) -> Self {
        match self.segments.len() {
            0 | 1 => Self::identity(),
            len => Self::from_segments(self.segments[..len - 1].to_vec()),
        }
    }

    /// Returns a sub-path of at most `count` segments starting at `start`.
    ///
    /// The requested range is clamped to the available segments; an empty
    /// range yields the identity path.
    ///
    /// # Examples
    ///
    /// ```
    /// use nl_access::path::NodePath;
    ///
    /// let path = NodePath::parse("a.b[1].c").unwrap();
    /// assert_eq!(path.slice(0, 2).to_string(), "a.b");
    /// assert_eq!(path.slice(2, 10).to_string(), "[1].c");
    /// assert!(path.slice(9, 1).is_identity());
    /// ```
    pub fn slice(&self, start: usize, count: usize) -> Self {
        let start = start.min(self.segments.len());
        let end = start.saturating_add(count).min(self.segments.len());
        Self::from_segments(self.segments[start..end].to_vec())
    }

    /// Returns `true` if `prefix`'s segments lead this path.
    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Returns `true` if `suffix`'s segments trail this path.
    pub fn ends_with(&self, suffix: &NodePath) -> bool {
        self.segments.len() >= suffix.segments.len()
            && self.segments[self.segments.len() - suffix.segments.len()..] == suffix.segments[..]
    }

    /// Returns the first segment, if any.
    #[inline]
    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// Returns the last segment, if any.
    #[inline]
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }
}

/// Renders the canonical text for a segment sequence.
///
/// Member segments are preceded by `.` unless they open the path; index
/// segments attach directly to the preceding segment.
fn render(segments: &[Segment]) -> String {
    use core::fmt::Write;

    let mut out = String::new();
    for segment in segments {
        if let Segment::Field(_) = segment
            && !out.is_empty()
        {
            out.push('.');
        }
        // Infallible for `String`.
        let _ = write!(out, "{segment}");
    }
    out
}

// -----------------------------------------------------------------------------
// Canonical-text based trait impls

impl PartialEq for NodePath {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for NodePath {}

impl Hash for NodePath {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for NodePath {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodePath {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl fmt::Display for NodePath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({:?})", &*self.text)
    }
}

impl Default for NodePath {
    #[inline]
    fn default() -> Self {
        Self::identity()
    }
}

impl FromStr for NodePath {
    type Err = PathParseError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'a> IntoIterator for &'a NodePath {
    type Item = &'a Segment;
    type IntoIter = core::slice::Iter<'a, Segment>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Segment> for NodePath {
    fn from_iter<T: IntoIterator<Item = Segment>>(iter: T) -> Self {
        Self::from_segments(iter.into_iter().collect::<Vec<_>>())
    }
}

// -----------------------------------------------------------------------------
// Tests
