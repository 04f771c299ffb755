use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::error::Error;
use core::fmt;

use crate::node::NodeKind;
use crate::path::{NodePath, PathParseError};

// -----------------------------------------------------------------------------
// AccessErrorKind

/// The ways a path access can fail.
#[derive(Debug)]
pub enum AccessErrorKind {
    /// The path text itself is malformed.
    Syntax(PathParseError),
    /// The owner shape declares no member with the given name, or a member
    /// segment was applied to a non-object shape.
    MemberNotFound {
        member: Box<str>,
        owner: &'static str,
    },
    /// An index segment pointed past the end of the sequence.
    IndexOutOfRange { index: usize, len: usize },
    /// An index segment was applied to a shape that is not a sequence.
    IndexingNotSupported { kind: NodeKind },
    /// The value's type is not assignable to the target, and no numeric
    /// conversion applies.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A write or mutable traversal went through a read-only member.
    ReadOnlyMember { member: Cow<'static, str> },
    /// An index segment targeted a sequence whose elements are themselves
    /// sequences; such interiors are reached through delegation instead.
    NestedSequence,
    /// The target is an optional member that is currently absent.
    Absent,
    /// The operation is structurally impossible at the target,
    /// e.g. removing a required member with no default.
    InvalidOperation(Cow<'static, str>),
    /// A compiled accessor was applied to a node whose runtime structure
    /// does not match its shape. Indicates a broken [`Node`] implementation.
    ///
    /// [`Node`]: crate::node::Node
    IncompatibleKind,
}

impl fmt::Display for AccessErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(err) => write!(f, "{err}"),
            Self::MemberNotFound { member, owner } => {
                write!(f, "shape `{owner}` has no member `{member}`")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for a sequence of length {len}")
            }
            Self::IndexingNotSupported { kind } => {
                write!(f, "cannot index into a {kind} shape")
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected a value of type `{expected}`, found `{found}`")
            }
            Self::ReadOnlyMember { member } => {
                write!(f, "member `{member}` is read-only")
            }
            Self::NestedSequence => {
                f.write_str("sequences of sequences cannot be indexed directly")
            }
            Self::Absent => f.write_str("optional member is absent"),
            Self::InvalidOperation(reason) => f.write_str(reason),
            Self::IncompatibleKind => {
                f.write_str("node structure does not match its compiled shape")
            }
        }
    }
}

impl From<PathParseError> for AccessErrorKind {
    #[inline]
    fn from(err: PathParseError) -> Self {
        Self::Syntax(err)
    }
}

// -----------------------------------------------------------------------------
// AccessError

/// A failed path access, annotated with where the failure occurred.
///
/// `path` is the offending sub-path: the prefix of the requested path up to
/// and including the segment that failed to resolve. `owner` names the shape
/// the failing segment was applied to.
///
/// # Examples
///
/// ```
/// use nl_access::{AccessErrorKind, Navigator, NodePath, derive::NodeShape};
///
/// #[derive(NodeShape, Clone)]
/// struct Root {
///     items: Vec<i32>,
/// }
///
/// let root = Root { items: vec![1] };
/// let nav = Navigator::new();
///
/// let err = nav
///     .get::<i32>(&root, &NodePath::parse("items[7]").unwrap())
///     .unwrap_err();
///
/// assert_eq!(err.path().to_string(), "items[7]");
/// assert!(matches!(
///     err.kind(),
///     AccessErrorKind::IndexOutOfRange { index: 7, len: 1 }
/// ));
/// ```
#[derive(Debug)]
pub struct AccessError {
    kind: AccessErrorKind,
    path: NodePath,
    owner: &'static str,
}

impl AccessError {
    /// Creates a new error for the given offending sub-path and owner shape.
    pub fn new(kind: AccessErrorKind, path: NodePath, owner: &'static str) -> Self {
        Self { kind, path, owner }
    }

    /// Returns what went wrong.
    #[inline]
    pub fn kind(&self) -> &AccessErrorKind {
        &self.kind
    }

    /// Returns the offending sub-path.
    #[inline]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Returns the name of the shape the failing segment was applied to.
    #[inline]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Consumes the error, returning its kind.
    #[inline]
    pub fn into_kind(self) -> AccessErrorKind {
        self.kind
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to access `{}` on `{}`: {}",
            self.path, self.owner, self.kind
        )
    }
}

impl Error for AccessError {}
