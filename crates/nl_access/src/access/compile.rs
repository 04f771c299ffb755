//! Compilation of single-segment access routines.
//!
//! An [`Accessor`] binds one (owner shape, segment, value shape) triple to a
//! set of specialized closures. Everything that can be decided from shape
//! metadata alone is decided here, once: member existence, writability,
//! element types, assignability and numeric conversions. The closures only
//! perform the residual runtime work (bounds checks, presence checks, the
//! actual reads and writes).

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;

use crate::access::error::AccessErrorKind;
use crate::impls::{numeric_pair, numeric_vtable};
use crate::info::ShapeInfo;
use crate::node::{MemberWriteError, Node, NodeKind};
use crate::path::Segment;

// -----------------------------------------------------------------------------
// ValueShape

/// The value type an access routine is specialized for.
///
/// Intermediate hops and untyped reads use [`Any`](ValueShape::Any); typed
/// terminal reads and writes use [`Of`](ValueShape::Of), letting the
/// compiler reject mismatches and set up numeric conversions ahead of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// No particular type; values pass through as they are stored.
    Any,
    /// A concrete value type.
    Of {
        ty_id: TypeId,
        name: &'static str,
    },
}

impl ValueShape {
    /// Returns the shape of a statically known value type.
    pub fn of<T: Any>() -> Self {
        Self::Of {
            ty_id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// Returns the shape of a value held behind a node.
    pub fn for_node(node: &dyn Node) -> Self {
        Self::Of {
            ty_id: node.ty_id(),
            name: node.shape().name(),
        }
    }

    /// Returns the cache key component of this value shape.
    #[inline]
    pub(crate) fn key(&self) -> Option<TypeId> {
        match self {
            Self::Any => None,
            Self::Of { ty_id, .. } => Some(*ty_id),
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("_"),
            Self::Of { name, .. } => f.write_str(name),
        }
    }
}

// -----------------------------------------------------------------------------
// Accessor

type FetchFn = Arc<dyn for<'r> Fn(&'r dyn Node) -> Result<&'r dyn Node, AccessErrorKind> + Send + Sync>;
type FetchMutFn =
    Box<dyn for<'r> Fn(&'r mut dyn Node) -> Result<&'r mut dyn Node, AccessErrorKind> + Send + Sync>;
type ReadBoxedFn = Box<dyn Fn(&dyn Node) -> Result<Box<dyn Node>, AccessErrorKind> + Send + Sync>;
type WriteFn =
    Box<dyn Fn(&mut dyn Node, Box<dyn Node>) -> Result<(), AccessErrorKind> + Send + Sync>;

/// A compiled, reusable access routine for one path segment.
///
/// Accessors are owned by the [`AccessorCache`](crate::access::AccessorCache)
/// and shared behind an [`Arc`]; they hold no per-call state.
pub struct Accessor {
    fetch: FetchFn,
    fetch_mut: Option<FetchMutFn>,
    read_boxed: ReadBoxedFn,
    write: Option<WriteFn>,
    child: &'static ShapeInfo,
    member: Option<&'static str>,
    optional: bool,
}

impl Accessor {
    /// Resolves the segment against `owner` and borrows the target.
    #[inline]
    pub fn read<'r>(&self, owner: &'r dyn Node) -> Result<&'r dyn Node, AccessErrorKind> {
        (self.fetch)(owner)
    }

    /// Resolves the segment against `owner` and mutably borrows the target.
    ///
    /// Fails with [`ReadOnlyMember`](AccessErrorKind::ReadOnlyMember) if the
    /// segment names a read-only member.
    pub fn read_mut<'r>(
        &self,
        owner: &'r mut dyn Node,
    ) -> Result<&'r mut dyn Node, AccessErrorKind> {
        match &self.fetch_mut {
            Some(fetch) => fetch(owner),
            None => Err(self.read_only()),
        }
    }

    /// Resolves the segment and copies the target out, converting it to the
    /// value shape this accessor was compiled for.
    #[inline]
    pub fn read_boxed(&self, owner: &dyn Node) -> Result<Box<dyn Node>, AccessErrorKind> {
        (self.read_boxed)(owner)
    }

    /// Resolves the segment against `owner` and writes `value` at the
    /// target.
    ///
    /// Fails with [`ReadOnlyMember`](AccessErrorKind::ReadOnlyMember) if the
    /// segment names a read-only member.
    pub fn write(
        &self,
        owner: &mut dyn Node,
        value: Box<dyn Node>,
    ) -> Result<(), AccessErrorKind> {
        match &self.write {
            Some(write) => write(owner, value),
            None => Err(self.read_only()),
        }
    }

    /// Returns the shape of the value this segment resolves to.
    #[inline]
    pub fn child(&self) -> &'static ShapeInfo {
        self.child
    }

    /// Returns `true` if the segment names an optional member.
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns `true` if the target can be written through this accessor.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    fn read_only(&self) -> AccessErrorKind {
        AccessErrorKind::ReadOnlyMember {
            member: self.member.unwrap_or("").into(),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("child", &self.child.name())
            .field("member", &self.member)
            .field("optional", &self.optional)
            .field("writable", &self.write.is_some())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Conversion

/// Converts a boxed value toward `want`, routing numeric pairs through
/// `f64`.
pub(crate) fn convert_to(
    value: Box<dyn Node>,
    want: &ValueShape,
) -> Result<Box<dyn Node>, AccessErrorKind> {
    let &ValueShape::Of { ty_id, name } = want else {
        return Ok(value);
    };
    if value.ty_id() == ty_id {
        return Ok(value);
    }
    match (numeric_vtable(value.ty_id()), numeric_vtable(ty_id)) {
        (Some(src), Some(dst)) => {
            let widened = (src.to_f64)(&*value).ok_or(AccessErrorKind::IncompatibleKind)?;
            Ok((dst.from_f64)(widened))
        }
        _ => Err(AccessErrorKind::TypeMismatch {
            expected: name,
            found: value.shape().name(),
        }),
    }
}

/// Checks that a value of shape `value` can be stored into `child`.
fn assignable(value: &ValueShape, child: &'static ShapeInfo) -> Result<(), AccessErrorKind> {
    match value {
        ValueShape::Any => Ok(()),
        ValueShape::Of { ty_id, name } => {
            if *ty_id == child.ty_id() || numeric_pair(*ty_id, child.ty_id()) {
                Ok(())
            } else {
                Err(AccessErrorKind::TypeMismatch {
                    expected: child.name(),
                    found: name,
                })
            }
        }
    }
}

fn make_read_boxed(
    fetch: FetchFn,
    child: &'static ShapeInfo,
    value: &ValueShape,
) -> Result<ReadBoxedFn, AccessErrorKind> {
    match value {
        ValueShape::Any => Ok(Box::new(move |node| Ok(fetch(node)?.clone_node()))),
        ValueShape::Of { ty_id, name } => {
            if *ty_id == child.ty_id() {
                return Ok(Box::new(move |node| Ok(fetch(node)?.clone_node())));
            }
            match (numeric_vtable(child.ty_id()), numeric_vtable(*ty_id)) {
                (Some(src), Some(dst)) => Ok(Box::new(move |node| {
                    let raw = fetch(node)?;
                    let widened = (src.to_f64)(raw).ok_or(AccessErrorKind::IncompatibleKind)?;
                    Ok((dst.from_f64)(widened))
                })),
                _ => Err(AccessErrorKind::TypeMismatch {
                    expected: name,
                    found: child.name(),
                }),
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Compilation

/// Compiles the access routine for one segment applied to `owner`.
pub(crate) fn compile(
    owner: &'static ShapeInfo,
    segment: &Segment,
    value: &ValueShape,
) -> Result<Accessor, AccessErrorKind> {
    match segment {
        Segment::Field(name) => compile_field(owner, name, value),
        Segment::Index(index) => compile_index(owner, *index, value),
    }
}

fn compile_field(
    owner: &'static ShapeInfo,
    name: &str,
    value: &ValueShape,
) -> Result<Accessor, AccessErrorKind> {
    let missing = || AccessErrorKind::MemberNotFound {
        member: name.into(),
        owner: owner.name(),
    };
    if owner.kind() != NodeKind::Object {
        return Err(missing());
    }
    let member = owner.member(name).ok_or_else(missing)?;

    let member_name = member.name();
    let child = member.shape();
    let optional = member.is_optional();
    let owner_name = owner.name();

    let fetch: FetchFn = Arc::new(move |node: &dyn Node| {
        let object = node
            .node_ref()
            .as_object()
            .ok_or(AccessErrorKind::IncompatibleKind)?;
        object.member(member_name).ok_or(AccessErrorKind::Absent)
    });

    let fetch_mut: Option<FetchMutFn> = member.is_writable().then(|| -> FetchMutFn {
        Box::new(move |node: &mut dyn Node| {
            let object = node
                .node_mut()
                .as_object()
                .ok_or(AccessErrorKind::IncompatibleKind)?;
            object.member_mut(member_name).ok_or(AccessErrorKind::Absent)
        })
    });

    let read_boxed = make_read_boxed(fetch.clone(), child, value)?;

    let write: Option<WriteFn> = if member.is_writable() {
        assignable(value, child)?;
        let child_want = ValueShape::Of {
            ty_id: child.ty_id(),
            name: child.name(),
        };
        Some(Box::new(move |node, incoming| {
            let incoming = convert_to(incoming, &child_want)?;
            let object = node
                .node_mut()
                .as_object()
                .ok_or(AccessErrorKind::IncompatibleKind)?;
            object.set_member(member_name, incoming).map_err(|err| match err {
                MemberWriteError::Missing => AccessErrorKind::MemberNotFound {
                    member: member_name.into(),
                    owner: owner_name,
                },
                MemberWriteError::ReadOnly => AccessErrorKind::ReadOnlyMember {
                    member: member_name.into(),
                },
                MemberWriteError::Type(rejected) => AccessErrorKind::TypeMismatch {
                    expected: child.name(),
                    found: rejected.shape().name(),
                },
            })
        }))
    } else {
        None
    };

    Ok(Accessor {
        fetch,
        fetch_mut,
        read_boxed,
        write,
        child,
        member: Some(member_name),
        optional,
    })
}

fn compile_index(
    owner: &'static ShapeInfo,
    index: usize,
    value: &ValueShape,
) -> Result<Accessor, AccessErrorKind> {
    if owner.kind() != NodeKind::Sequence {
        return Err(AccessErrorKind::IndexingNotSupported { kind: owner.kind() });
    }
    let child = owner
        .element_shape()
        .ok_or(AccessErrorKind::IncompatibleKind)?;
    if child.kind() == NodeKind::Sequence {
        return Err(AccessErrorKind::NestedSequence);
    }

    let fetch: FetchFn = Arc::new(move |node: &dyn Node| {
        let sequence = node
            .node_ref()
            .as_sequence()
            .ok_or(AccessErrorKind::IncompatibleKind)?;
        let len = sequence.len();
        if index >= len {
            return Err(AccessErrorKind::IndexOutOfRange { index, len });
        }
        sequence.element(index).ok_or(AccessErrorKind::IncompatibleKind)
    });

    let fetch_mut: FetchMutFn = Box::new(move |node: &mut dyn Node| {
        let sequence = node
            .node_mut()
            .as_sequence()
            .ok_or(AccessErrorKind::IncompatibleKind)?;
        let len = sequence.len();
        if index >= len {
            return Err(AccessErrorKind::IndexOutOfRange { index, len });
        }
        sequence
            .element_mut(index)
            .ok_or(AccessErrorKind::IncompatibleKind)
    });

    let read_boxed = make_read_boxed(fetch.clone(), child, value)?;

    assignable(value, child)?;
    let child_want = ValueShape::Of {
        ty_id: child.ty_id(),
        name: child.name(),
    };
    let write: WriteFn = Box::new(move |node, incoming| {
        let incoming = convert_to(incoming, &child_want)?;
        let sequence = node
            .node_mut()
            .as_sequence()
            .ok_or(AccessErrorKind::IncompatibleKind)?;
        let len = sequence.len();
        if index >= len {
            return Err(AccessErrorKind::IndexOutOfRange { index, len });
        }
        sequence
            .set_element(index, incoming)
            .map_err(|rejected| AccessErrorKind::TypeMismatch {
                expected: child.name(),
                found: rejected.shape().name(),
            })
    });

    Ok(Accessor {
        fetch,
        fetch_mut: Some(fetch_mut),
        read_boxed,
        write: Some(write),
        child,
        member: None,
        optional: false,
    })
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ValueShape, compile};
    use crate::access::error::AccessErrorKind;
    use crate::info::Shaped;
    use crate::path::Segment;
    use alloc::boxed::Box;
    use alloc::vec;

    use crate::derive::NodeShape;

    #[derive(NodeShape, Clone)]
    struct Probe {
        value: i32,
        #[node(readonly)]
        id: u32,
    }

    fn field(name: &'static str) -> Segment {
        Segment::field(name)
    }

    #[test]
    fn field_read_and_write() {
        let mut probe = Probe { value: 1, id: 7 };
        let accessor = compile(Probe::shape_info(), &field("value"), &ValueShape::Any).unwrap();

        let read = accessor.read(&probe).unwrap();
        assert_eq!(read.downcast_ref::<i32>(), Some(&1));

        accessor.write(&mut probe, Box::new(5_i32)).unwrap();
        assert_eq!(probe.value, 5);
    }

    #[test]
    fn unknown_member_fails_at_compile() {
        let err = compile(Probe::shape_info(), &field("missing"), &ValueShape::Any).unwrap_err();
        assert!(matches!(err, AccessErrorKind::MemberNotFound { .. }));
    }

    #[test]
    fn readonly_member_refuses_mutation() {
        let mut probe = Probe { value: 1, id: 7 };
        let accessor = compile(Probe::shape_info(), &field("id"), &ValueShape::Any).unwrap();

        assert!(accessor.read(&probe).is_ok());
        assert!(matches!(
            accessor.write(&mut probe, Box::new(9_u32)),
            Err(AccessErrorKind::ReadOnlyMember { .. })
        ));
        assert!(matches!(
            accessor.read_mut(&mut probe),
            Err(AccessErrorKind::ReadOnlyMember { .. })
        ));
    }

    #[test]
    fn type_mismatch_fails_at_compile() {
        let err = compile(
            Probe::shape_info(),
            &field("value"),
            &ValueShape::of::<bool>(),
        )
        .unwrap_err();
        assert!(matches!(err, AccessErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn numeric_reads_are_widened() {
        let probe = Probe { value: 41, id: 7 };
        let accessor = compile(
            Probe::shape_info(),
            &field("value"),
            &ValueShape::of::<f64>(),
        )
        .unwrap();

        let read = accessor.read_boxed(&probe).unwrap();
        assert_eq!(read.take::<f64>().unwrap(), 41.0);
    }

    #[test]
    fn index_bounds_are_checked_at_runtime() {
        let items = vec![1_i32, 2];
        let accessor = compile(
            <Vec<i32>>::shape_info(),
            &Segment::Index(5),
            &ValueShape::Any,
        )
        .unwrap();

        assert!(matches!(
            accessor.read(&items),
            Err(AccessErrorKind::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn indexing_a_leaf_is_rejected() {
        let err = compile(i32::shape_info(), &Segment::Index(0), &ValueShape::Any).unwrap_err();
        assert!(matches!(
            err,
            AccessErrorKind::IndexingNotSupported { .. }
        ));
    }

    #[test]
    fn nested_sequences_are_rejected() {
        let err = compile(
            <Vec<Vec<i32>>>::shape_info(),
            &Segment::Index(0),
            &ValueShape::Any,
        )
        .unwrap_err();
        assert!(matches!(err, AccessErrorKind::NestedSequence));
    }
}
