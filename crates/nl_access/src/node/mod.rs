//! The object-safe protocol node shapes implement.
//!
//! Everything the engine touches is a [`Node`]: the root handed to a
//! [`Navigator`](crate::access::Navigator), every intermediate hop, and the
//! values read out or written in. The trait is deliberately small; structural
//! capabilities live in the subtraits [`Object`], [`Sequence`] and
//! [`Navigable`], reachable through the [`NodeRef`]/[`NodeMut`] views.
//!
//! Most implementations come from `#[derive(NodeShape)]`; manual impls are
//! only needed for shapes with custom storage or delegated navigation.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::info::ShapeInfo;

mod navigable;
mod object;
mod sequence;

pub use navigable::Navigable;
pub use object::{MemberWriteError, Object};
pub use sequence::Sequence;

// -----------------------------------------------------------------------------
// NodeKind

/// The structural category of a node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A shape with named members, addressed by [`Segment::Field`].
    ///
    /// [`Segment::Field`]: crate::path::Segment::Field
    Object,
    /// An ordered collection, addressed by [`Segment::Index`].
    ///
    /// [`Segment::Index`]: crate::path::Segment::Index
    Sequence,
    /// A terminal value with no addressable interior.
    Leaf,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::Sequence => f.write_str("sequence"),
            Self::Leaf => f.write_str("leaf"),
        }
    }
}

// -----------------------------------------------------------------------------
// Kind views

/// An immutable view of a node, enumerated by structural capability.
pub enum NodeRef<'a> {
    Object(&'a dyn Object),
    Sequence(&'a dyn Sequence),
    Leaf(&'a dyn Node),
}

impl<'a> NodeRef<'a> {
    /// Returns the object view, if this node has named members.
    #[inline]
    pub fn as_object(self) -> Option<&'a dyn Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the sequence view, if this node is an ordered collection.
    #[inline]
    pub fn as_sequence(self) -> Option<&'a dyn Sequence> {
        match self {
            Self::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    /// Returns the structural category of the viewed node.
    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Object(_) => NodeKind::Object,
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Leaf(_) => NodeKind::Leaf,
        }
    }
}

/// A mutable view of a node, enumerated by structural capability.
pub enum NodeMut<'a> {
    Object(&'a mut dyn Object),
    Sequence(&'a mut dyn Sequence),
    Leaf(&'a mut dyn Node),
}

impl<'a> NodeMut<'a> {
    /// Returns the mutable object view, if this node has named members.
    #[inline]
    pub fn as_object(self) -> Option<&'a mut dyn Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the mutable sequence view, if this node is an ordered
    /// collection.
    #[inline]
    pub fn as_sequence(self) -> Option<&'a mut dyn Sequence> {
        match self {
            Self::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Node

/// The foundational trait for path-based access.
///
/// A `Node` couples a value with the static [`ShapeInfo`] describing its
/// structure. Access routines are compiled against the shape and executed
/// against the value, so the two must always agree; the derive macro
/// guarantees this.
///
/// # Implementation Guide
///
/// Use `#[derive(NodeShape)]` wherever possible. A manual implementation
/// follows this pattern:
///
/// ```rust, ignore
/// fn shape(&self) -> &'static ShapeInfo {
///     <Self as Shaped>::shape_info()
/// }
///
/// fn node_ref(&self) -> NodeRef<'_> {
///     NodeRef::Object(self) // or Sequence / Leaf
/// }
///
/// fn set_node(&mut self, value: Box<dyn Node>) -> Result<(), Box<dyn Node>> {
///     *self = value.take::<Self>()?;
///     Ok(())
/// }
/// ```
pub trait Node: Any + Send + Sync {
    /// Returns the static shape description of this value's type.
    fn shape(&self) -> &'static ShapeInfo;

    /// Casts this type to a node.
    #[inline(always)]
    fn as_node(&self) -> &dyn Node
    where
        Self: Sized,
    {
        self
    }

    /// Casts this type to a mutable node.
    #[inline(always)]
    fn as_node_mut(&mut self) -> &mut dyn Node
    where
        Self: Sized,
    {
        self
    }

    /// Casts this type to a boxed node.
    #[inline(always)]
    fn into_node(self: Box<Self>) -> Box<dyn Node>
    where
        Self: Sized,
    {
        self
    }

    /// Casts this type to a boxed node.
    #[inline(always)]
    fn into_boxed_node(self) -> Box<dyn Node>
    where
        Self: Sized,
    {
        Box::new(self)
    }

    /// Returns the [`TypeId`] of the underlying type.
    ///
    /// `Box<dyn Node>::type_id` returns the container's type ID rather than
    /// the inner value's, which is prone to errors; prefer this method.
    #[inline]
    fn ty_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Returns an immutable capability view of this node.
    fn node_ref(&self) -> NodeRef<'_>;

    /// Returns a mutable capability view of this node.
    fn node_mut(&mut self) -> NodeMut<'_>;

    /// Clones the underlying value into a new boxed node of the same type.
    fn clone_node(&self) -> Box<dyn Node>;

    /// Replaces the underlying value with `value`.
    ///
    /// Fails with the rejected box if `value` is not of the same type.
    fn set_node(&mut self, value: Box<dyn Node>) -> Result<(), Box<dyn Node>>;

    /// Returns the delegation hook, if this shape manages its own interior.
    ///
    /// See [`Navigable`] for the protocol.
    #[inline]
    fn as_navigable(&self) -> Option<&dyn Navigable> {
        None
    }

    /// Mutable counterpart of [`as_navigable`](Node::as_navigable).
    #[inline]
    fn as_navigable_mut(&mut self) -> Option<&mut dyn Navigable> {
        None
    }

    /// Debug formatter for the value.
    ///
    /// The default renders objects and sequences structurally; leaf shapes
    /// should override this with their own [`Debug`](fmt::Debug) output.
    fn debug_node(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node_ref() {
            NodeRef::Object(object) => {
                let mut dbg = f.debug_struct(self.shape().name());
                for at in 0..object.member_len() {
                    if let (Some(name), Some(value)) =
                        (object.member_name_at(at), object.member_at(at))
                    {
                        dbg.field(name, &value);
                    }
                }
                dbg.finish()
            }
            NodeRef::Sequence(sequence) => f
                .debug_list()
                .entries((0..sequence.len()).filter_map(|at| sequence.element(at)))
                .finish(),
            NodeRef::Leaf(_) => write!(f, "{}(..)", self.shape().name()),
        }
    }
}

impl dyn Node {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline(always)]
    pub fn is<T: Any>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    /// Returns the structural category of this node's shape.
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.shape().kind()
    }

    /// Returns `true` if this shape is flagged as a graph-node entity.
    ///
    /// Graph-node entities are what [`collect`](crate::access::Navigator::collect)
    /// enumerates.
    #[inline]
    pub fn is_graph_node(&self) -> bool {
        self.shape().is_graph_node()
    }

    /// Downcasts the value to type `T` by reference.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nl_access::Node;
    /// let x: &dyn Node = &10_i32;
    /// assert_eq!(x.downcast_ref::<i32>(), Some(&10));
    /// assert_eq!(x.downcast_ref::<bool>(), None);
    /// ```
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    /// Downcasts the value to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        <dyn Any>::downcast_mut(self)
    }

    /// Downcasts the value to type `T`, unboxing and consuming the trait
    /// object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nl_access::Node;
    /// let x: Box<dyn Node> = Box::new(10_i32);
    ///
    /// let x = x.take::<i32>().unwrap();
    /// assert_eq!(x, 10);
    /// ```
    #[inline]
    pub fn take<T: Any>(self: Box<dyn Node>) -> Result<T, Box<dyn Node>> {
        if self.is::<T>() {
            // TODO: replace with `downcast_unchecked` when it's stable.
            #[expect(unsafe_code, reason = "type is already checked")]
            Ok(unsafe { *<Box<dyn Any>>::downcast::<T>(self).unwrap_unchecked() })
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for dyn Node {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.debug_node(f)
    }
}
