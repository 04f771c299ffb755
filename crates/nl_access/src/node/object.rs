use alloc::boxed::Box;

use crate::node::Node;

// -----------------------------------------------------------------------------
// Object

/// A node shape with named members.
///
/// Member existence and writability are validated against the shape's
/// [`MemberInfo`] table when an access routine is compiled, so the runtime
/// methods only report *state*: a `None` from [`member`] means the member is
/// optional and currently absent, never that the name is unknown.
///
/// [`MemberInfo`]: crate::info::MemberInfo
/// [`member`]: Object::member
pub trait Object: Node {
    /// Returns the member named `name`, or `None` if it is currently absent.
    fn member(&self, name: &str) -> Option<&dyn Node>;

    /// Returns the member named `name` mutably, or `None` if it is currently
    /// absent or read-only.
    fn member_mut(&mut self, name: &str) -> Option<&mut dyn Node>;

    /// Replaces the member named `name` with `value`.
    ///
    /// Absent optional members become present.
    fn set_member(&mut self, name: &str, value: Box<dyn Node>) -> Result<(), MemberWriteError>;

    /// Resets the member named `name` to absent.
    ///
    /// Returns `false` if the member is not optional (non-optional members
    /// cannot be cleared) or was already absent.
    fn clear_member(&mut self, name: &str) -> bool;

    /// Returns the number of members declared by this shape.
    fn member_len(&self) -> usize;

    /// Returns the member at declaration position `at`, if present.
    fn member_at(&self, at: usize) -> Option<&dyn Node>;

    /// Returns the name of the member at declaration position `at`.
    fn member_name_at(&self, at: usize) -> Option<&'static str>;
}

// -----------------------------------------------------------------------------
// MemberWriteError

/// The ways a member write can fail at runtime.
#[derive(Debug)]
pub enum MemberWriteError {
    /// The shape declares no member with the given name.
    Missing,
    /// The member is declared read-only.
    ReadOnly,
    /// The value's type does not match the member's declared type.
    ///
    /// Carries the rejected value back to the caller.
    Type(Box<dyn Node>),
}
