//! Static shape descriptions consulted when access routines are compiled.
//!
//! Every node type exposes one lazily-built, `'static` [`ShapeInfo`] through
//! the [`Shaped`] trait. The compiler works entirely from these tables:
//! member existence, writability, optionality and element types are all
//! decided here, never by probing live data.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::node::{Node, NodeKind};

// -----------------------------------------------------------------------------
// Shaped

/// A type with a static shape description.
///
/// Usually implemented through `#[derive(NodeShape)]`, which builds the
/// [`ShapeInfo`] in a [`ShapeCell`](crate::impls::ShapeCell) on first access.
///
/// # Examples
///
/// ```
/// use nl_access::{Shaped, derive::NodeShape};
/// use nl_access::node::NodeKind;
///
/// #[derive(NodeShape, Clone)]
/// struct Socket {
///     label: String,
/// }
///
/// let info = Socket::shape_info();
/// assert_eq!(info.name(), "Socket");
/// assert_eq!(info.kind(), NodeKind::Object);
/// assert!(info.member("label").is_some());
/// ```
pub trait Shaped {
    /// Returns the static shape description of this type.
    fn shape_info() -> &'static ShapeInfo;
}

// -----------------------------------------------------------------------------
// Semantics

/// How a shape's values behave when read out of their owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semantics {
    /// Values are mutated in place inside their owner.
    Reference,
    /// Values are copied out of their owner; mutating the copy does not
    /// affect the owner until the copy is written back.
    ///
    /// Writes through a value-semantics hop trigger the engine's copy-back
    /// protocol.
    Value,
}

// -----------------------------------------------------------------------------
// MemberInfo

/// Information for one named member of an object shape.
#[derive(Clone)]
pub struct MemberInfo {
    name: &'static str,
    ty_id: TypeId,
    // `ShapeInfo` is created on first access; a function pointer delays it.
    shape: fn() -> &'static ShapeInfo,
    writable: bool,
    optional: bool,
}

impl MemberInfo {
    /// Creates the description of a required member of type `T`.
    pub const fn new<T: Shaped + Any>(name: &'static str) -> Self {
        Self {
            name,
            ty_id: TypeId::of::<T>(),
            shape: T::shape_info,
            writable: true,
            optional: false,
        }
    }

    /// Creates the description of an optional member storing `T`.
    ///
    /// `T` is the *inner* type: a field declared `Option<T>` is addressed,
    /// read and written as a `T` that may be absent.
    pub const fn optional<T: Shaped + Any>(name: &'static str) -> Self {
        Self {
            name,
            ty_id: TypeId::of::<T>(),
            shape: T::shape_info,
            writable: true,
            optional: true,
        }
    }

    /// Marks this member as read-only.
    pub const fn readonly(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Returns the member name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the [`TypeId`] of the member's stored type.
    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    /// Returns the shape of the member's stored type.
    #[inline]
    pub fn shape(&self) -> &'static ShapeInfo {
        (self.shape)()
    }

    /// Returns `true` unless the member is declared read-only.
    #[inline]
    pub const fn is_writable(&self) -> bool {
        self.writable
    }

    /// Returns `true` if the member may be absent.
    #[inline]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Check if the given type matches the member's stored type.
    #[inline]
    pub fn type_is<T: Any>(&self) -> bool {
        self.ty_id == TypeId::of::<T>()
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("writable", &self.writable)
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ShapeInfo

/// The static description of a node shape.
///
/// Built once per type on first access and cached for the program lifetime;
/// see [`ShapeCell`](crate::impls::ShapeCell) and
/// [`GenericShapeCell`](crate::impls::GenericShapeCell).
pub struct ShapeInfo {
    ty_id: TypeId,
    name: &'static str,
    path: &'static str,
    kind: NodeKind,
    semantics: Semantics,
    graph_node: bool,
    members: Box<[MemberInfo]>,
    element: Option<fn() -> &'static ShapeInfo>,
    default_fn: Option<fn() -> Box<dyn Node>>,
}

impl ShapeInfo {
    /// Creates the shape of an object type `T` with the given member table.
    pub fn object<T: Any>(name: &'static str, members: impl Into<Box<[MemberInfo]>>) -> Self {
        Self {
            ty_id: TypeId::of::<T>(),
            name,
            path: core::any::type_name::<T>(),
            kind: NodeKind::Object,
            semantics: Semantics::Reference,
            graph_node: false,
            members: members.into(),
            element: None,
            default_fn: None,
        }
    }

    /// Creates the shape of a sequence type `T` with the given element shape.
    pub fn sequence<T: Any>(name: &'static str, element: fn() -> &'static ShapeInfo) -> Self {
        Self {
            ty_id: TypeId::of::<T>(),
            name,
            path: core::any::type_name::<T>(),
            kind: NodeKind::Sequence,
            semantics: Semantics::Reference,
            graph_node: false,
            members: Box::new([]),
            element: Some(element),
            default_fn: None,
        }
    }

    /// Creates the shape of a terminal type `T`.
    pub fn leaf<T: Any>(name: &'static str) -> Self {
        Self {
            ty_id: TypeId::of::<T>(),
            name,
            path: core::any::type_name::<T>(),
            kind: NodeKind::Leaf,
            semantics: Semantics::Reference,
            graph_node: false,
            members: Box::new([]),
            element: None,
            default_fn: None,
        }
    }

    /// Flags this shape as a graph-node entity, making its values collectable.
    pub fn with_graph_node(mut self) -> Self {
        self.graph_node = true;
        self
    }

    /// Gives this shape value semantics; see [`Semantics::Value`].
    pub fn with_value_semantics(mut self) -> Self {
        self.semantics = Semantics::Value;
        self
    }

    /// Registers `T::default` as this shape's instantiator, enabling
    /// auto-instantiation of absent optional members during writes.
    pub fn with_default<T: Default + Node>(mut self) -> Self {
        fn make<T: Default + Node>() -> Box<dyn Node> {
            Box::new(T::default())
        }
        self.default_fn = Some(make::<T>);
        self
    }

    /// Returns the [`TypeId`] of the described type.
    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    /// Returns the short, human-facing type name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the full type path, as produced by [`core::any::type_name`].
    #[inline]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the structural category.
    #[inline]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the read-out behavior of values of this shape.
    #[inline]
    pub const fn semantics(&self) -> Semantics {
        self.semantics
    }

    /// Returns `true` if values of this shape are copied out of their owner.
    #[inline]
    pub const fn is_value(&self) -> bool {
        matches!(self.semantics, Semantics::Value)
    }

    /// Returns `true` if this shape is flagged as a graph-node entity.
    #[inline]
    pub const fn is_graph_node(&self) -> bool {
        self.graph_node
    }

    /// Returns the member named `name`, if the shape declares one.
    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|member| member.name == name)
    }

    /// Returns the member at declaration position `at`.
    #[inline]
    pub fn member_at(&self, at: usize) -> Option<&MemberInfo> {
        self.members.get(at)
    }

    /// Returns the declared member table.
    #[inline]
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    /// Returns the number of declared members.
    #[inline]
    pub fn member_len(&self) -> usize {
        self.members.len()
    }

    /// Returns the element shape, if this is a sequence shape.
    #[inline]
    pub fn element_shape(&self) -> Option<&'static ShapeInfo> {
        self.element.map(|element| element())
    }

    /// Returns `true` if the shape registered an instantiator.
    #[inline]
    pub const fn has_default(&self) -> bool {
        self.default_fn.is_some()
    }

    /// Creates a fresh default value of this shape, if an instantiator was
    /// registered.
    #[inline]
    pub fn create_default(&self) -> Option<Box<dyn Node>> {
        self.default_fn.map(|make| make())
    }

    /// Check if the given type matches the described one.
    #[inline]
    pub fn type_is<T: Any>(&self) -> bool {
        self.ty_id == TypeId::of::<T>()
    }
}

impl fmt::Debug for ShapeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("semantics", &self.semantics)
            .field("graph_node", &self.graph_node)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{MemberInfo, Semantics, ShapeInfo, Shaped};
    use crate::node::NodeKind;

    #[derive(Clone)]
    struct Sample {
        _value: i32,
    }

    #[test]
    fn object_shape_tables() {
        let info = ShapeInfo::object::<Sample>(
            "Sample",
            [
                MemberInfo::new::<i32>("value"),
                MemberInfo::new::<bool>("flag").readonly(),
                MemberInfo::optional::<f64>("weight"),
            ],
        );

        assert_eq!(info.kind(), NodeKind::Object);
        assert_eq!(info.member_len(), 3);
        assert!(info.type_is::<Sample>());

        let value = info.member("value").unwrap();
        assert!(value.type_is::<i32>());
        assert!(value.is_writable());
        assert!(!value.is_optional());

        assert!(!info.member("flag").unwrap().is_writable());
        assert!(info.member("weight").unwrap().is_optional());
        assert!(info.member("missing").is_none());
    }

    #[test]
    fn builder_flags() {
        let info = ShapeInfo::leaf::<i32>("i32")
            .with_value_semantics()
            .with_default::<i32>();

        assert_eq!(info.semantics(), Semantics::Value);
        assert!(info.has_default());
        assert!(info.create_default().unwrap().is::<i32>());
    }

    #[test]
    fn sequence_element_shape() {
        let info = ShapeInfo::sequence::<Vec<i32>>("Vec<i32>", <i32 as Shaped>::shape_info);
        assert_eq!(info.kind(), NodeKind::Sequence);
        assert!(info.element_shape().unwrap().type_is::<i32>());
    }
}
