//! The path-walking engine.
//!
//! [`Navigator`] resolves a [`NodePath`] against a root node one segment at
//! a time, fetching (or compiling) the [`Accessor`](super::Accessor) for
//! each hop from its [`AccessorCache`]. Mutating walks implement two extra
//! protocols:
//!
//! - **copy-back**: a hop through a value-semantics shape clones the value
//!   out, recurses into the copy, and writes the copy back into its owner,
//!   so a deep write like `transform.position.x` lands one write-back per
//!   value-typed level.
//! - **auto-instantiation**: an absent optional member on the way to the
//!   target is created from its shape's default, provided the shape is not
//!   a graph-node entity. Read-only walks never instantiate.
//!
//! Any node that returns a hook from [`Node::as_navigable`] takes over the
//! remaining path at that point; see [`Navigable`](crate::node::Navigable).

use alloc::boxed::Box;

use crate::access::cache::AccessorCache;
use crate::access::compile::{ValueShape, convert_to};
use crate::access::error::{AccessError, AccessErrorKind};
use crate::info::ShapeInfo;
use crate::node::{Node, NodeMut};
use crate::path::{NodePath, Segment};

// -----------------------------------------------------------------------------
// Navigator

/// Reads, writes and restructures node graphs through textual paths.
///
/// A `Navigator` owns (or shares) an [`AccessorCache`]; construction is
/// cheap and the navigator itself holds no per-walk state, so one instance
/// can serve an entire editor session.
///
/// # Examples
///
/// ```
/// use nl_access::{Navigator, NodePath, derive::NodeShape};
///
/// #[derive(NodeShape, Clone)]
/// struct Item {
///     value: i32,
/// }
///
/// #[derive(NodeShape, Clone)]
/// struct Root {
///     items: Vec<Item>,
/// }
///
/// let mut root = Root {
///     items: vec![Item { value: 1 }, Item { value: 2 }],
/// };
/// let nav = Navigator::new();
/// let path = NodePath::parse("items[0].value").unwrap();
///
/// assert_eq!(nav.get::<i32>(&root, &path).unwrap(), 1);
/// nav.set(&mut root, &path, 10_i32).unwrap();
/// assert_eq!(root.items[0].value, 10);
/// ```
#[derive(Debug, Default)]
pub struct Navigator {
    cache: AccessorCache,
}

/// What a mutating walk does once it reaches the final segment.
enum Terminal {
    Set(Box<dyn Node>, ValueShape),
    Remove,
    Ensure,
}

fn err_at(
    kind: AccessErrorKind,
    path: &NodePath,
    depth: usize,
    owner: &'static ShapeInfo,
) -> AccessError {
    AccessError::new(kind, path.slice(0, depth + 1), owner.name())
}

impl Navigator {
    /// Creates a navigator with a fresh cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a navigator over an existing cache.
    pub fn with_cache(cache: AccessorCache) -> Self {
        Self { cache }
    }

    /// Returns the underlying accessor cache.
    #[inline]
    pub fn cache(&self) -> &AccessorCache {
        &self.cache
    }

    // -------------------------------------------------------------------------
    // Reads

    /// Resolves `path` and borrows the target node.
    ///
    /// The identity path resolves to `root` itself.
    pub fn get_ref<'r>(
        &self,
        root: &'r dyn Node,
        path: &NodePath,
    ) -> Result<&'r dyn Node, AccessError> {
        let mut current = root;
        for depth in 0..path.len() {
            if let Some(nav) = current.as_navigable() {
                return nav.nav_get(path, depth);
            }
            let shape = current.shape();
            let accessor = self
                .cache
                .get_or_compile(shape, &path.segments()[depth], &ValueShape::Any)
                .map_err(|kind| err_at(kind, path, depth, shape))?;
            current = accessor
                .read(current)
                .map_err(|kind| err_at(kind, path, depth, shape))?;
        }
        Ok(current)
    }

    /// Resolves `path` and copies the target out as an untyped node.
    pub fn get_boxed(&self, root: &dyn Node, path: &NodePath) -> Result<Box<dyn Node>, AccessError> {
        self.get_boxed_as(root, path, &ValueShape::Any)
    }

    /// Resolves `path` and copies the target out as a `T`.
    ///
    /// Numeric leaf values are converted when `T` is a different numeric
    /// type; any other type difference fails with
    /// [`TypeMismatch`](AccessErrorKind::TypeMismatch).
    pub fn get<T: Node>(&self, root: &dyn Node, path: &NodePath) -> Result<T, AccessError> {
        let boxed = self.get_boxed_as(root, path, &ValueShape::of::<T>())?;
        boxed.take::<T>().map_err(|rejected| {
            AccessError::new(
                AccessErrorKind::TypeMismatch {
                    expected: core::any::type_name::<T>(),
                    found: rejected.shape().name(),
                },
                path.clone(),
                root.shape().name(),
            )
        })
    }

    /// Like [`get`](Navigator::get), but returns `fallback` on any failure.
    pub fn get_or<T: Node>(&self, root: &dyn Node, path: &NodePath, fallback: T) -> T {
        self.get(root, path).unwrap_or(fallback)
    }

    fn get_boxed_as(
        &self,
        root: &dyn Node,
        path: &NodePath,
        want: &ValueShape,
    ) -> Result<Box<dyn Node>, AccessError> {
        let Some(last) = path.len().checked_sub(1) else {
            let shape = root.shape();
            return convert_to(root.clone_node(), want)
                .map_err(|kind| AccessError::new(kind, NodePath::identity(), shape.name()));
        };

        let mut current = root;
        for depth in 0..last {
            if let Some(nav) = current.as_navigable() {
                let target = nav.nav_get(path, depth)?;
                return convert_to(target.clone_node(), want)
                    .map_err(|kind| err_at(kind, path, last, target.shape()));
            }
            let shape = current.shape();
            let accessor = self
                .cache
                .get_or_compile(shape, &path.segments()[depth], &ValueShape::Any)
                .map_err(|kind| err_at(kind, path, depth, shape))?;
            current = accessor
                .read(current)
                .map_err(|kind| err_at(kind, path, depth, shape))?;
        }

        if let Some(nav) = current.as_navigable() {
            let target = nav.nav_get(path, last)?;
            return convert_to(target.clone_node(), want)
                .map_err(|kind| err_at(kind, path, last, target.shape()));
        }
        let shape = current.shape();
        let accessor = self
            .cache
            .get_or_compile(shape, &path.segments()[last], want)
            .map_err(|kind| err_at(kind, path, last, shape))?;
        accessor
            .read_boxed(current)
            .map_err(|kind| err_at(kind, path, last, shape))
    }

    // -------------------------------------------------------------------------
    // Writes

    /// Resolves `path` and writes `value` at the target.
    pub fn set<T: Node>(
        &self,
        root: &mut dyn Node,
        path: &NodePath,
        value: T,
    ) -> Result<(), AccessError> {
        self.set_boxed_as(root, path, Box::new(value), ValueShape::of::<T>())
    }

    /// Resolves `path` and writes an untyped node at the target.
    pub fn set_boxed(
        &self,
        root: &mut dyn Node,
        path: &NodePath,
        value: Box<dyn Node>,
    ) -> Result<(), AccessError> {
        let shape = ValueShape::for_node(&*value);
        self.set_boxed_as(root, path, value, shape)
    }

    fn set_boxed_as(
        &self,
        root: &mut dyn Node,
        path: &NodePath,
        value: Box<dyn Node>,
        shape: ValueShape,
    ) -> Result<(), AccessError> {
        if path.is_identity() {
            let root_shape = root.shape();
            if root_shape.is_value() {
                return Err(AccessError::new(
                    AccessErrorKind::InvalidOperation(
                        "cannot mutate a value-semantics root in place".into(),
                    ),
                    NodePath::identity(),
                    root_shape.name(),
                ));
            }
            let value = convert_to(
                value,
                &ValueShape::Of {
                    ty_id: root_shape.ty_id(),
                    name: root_shape.name(),
                },
            )
            .map_err(|kind| AccessError::new(kind, NodePath::identity(), root_shape.name()))?;
            return root.set_node(value).map_err(|rejected| {
                AccessError::new(
                    AccessErrorKind::TypeMismatch {
                        expected: root_shape.name(),
                        found: rejected.shape().name(),
                    },
                    NodePath::identity(),
                    root_shape.name(),
                )
            });
        }
        log::trace!("set `{path}` on `{}`", root.shape().name());
        self.apply_in(root, path, 0, Terminal::Set(value, shape))
    }

    /// Resolves `path` and removes or resets the target.
    ///
    /// - A sequence element is removed, shifting later elements down.
    /// - An absent-capable (optional) member is reset to absent.
    /// - A required member whose shape has a default is reset to it.
    pub fn remove(&self, root: &mut dyn Node, path: &NodePath) -> Result<(), AccessError> {
        if path.is_identity() {
            return Err(AccessError::new(
                AccessErrorKind::InvalidOperation("cannot remove the root".into()),
                NodePath::identity(),
                root.shape().name(),
            ));
        }
        log::trace!("remove `{path}` on `{}`", root.shape().name());
        self.apply_in(root, path, 0, Terminal::Remove)
    }

    /// Resolves `path`, instantiating absent optional members along the way,
    /// and ensures the target itself exists.
    pub fn ensure(&self, root: &mut dyn Node, path: &NodePath) -> Result<(), AccessError> {
        if path.is_identity() {
            return Ok(());
        }
        self.apply_in(root, path, 0, Terminal::Ensure)
    }

    // -------------------------------------------------------------------------
    // The mutating walk

    fn apply_in(
        &self,
        owner: &mut dyn Node,
        path: &NodePath,
        depth: usize,
        terminal: Terminal,
    ) -> Result<(), AccessError> {
        if let Some(nav) = owner.as_navigable_mut() {
            return match terminal {
                Terminal::Set(value, _) => nav.nav_set(path, depth, value),
                Terminal::Remove => nav.nav_remove(path, depth),
                Terminal::Ensure => nav.nav_get(path, depth).map(drop),
            };
        }

        let shape = owner.shape();
        if depth + 1 == path.len() {
            return self.apply_terminal(owner, shape, path, depth, terminal);
        }

        let accessor = self
            .cache
            .get_or_compile(shape, &path.segments()[depth], &ValueShape::Any)
            .map_err(|kind| err_at(kind, path, depth, shape))?;
        let child = accessor.child();
        let can_instantiate = accessor.is_optional()
            && child.has_default()
            && !child.is_graph_node()
            && !matches!(terminal, Terminal::Remove);

        if child.is_value() {
            // Copy-back: mutate a copy, then write it into the owner whole.
            let mut copy = match accessor.read_boxed(&*owner) {
                Ok(copy) => copy,
                Err(AccessErrorKind::Absent) if can_instantiate => child
                    .create_default()
                    .ok_or_else(|| err_at(AccessErrorKind::Absent, path, depth, shape))?,
                Err(kind) => return Err(err_at(kind, path, depth, shape)),
            };
            self.apply_in(copy.as_mut(), path, depth + 1, terminal)?;
            accessor
                .write(owner, copy)
                .map_err(|kind| err_at(kind, path, depth, shape))
        } else {
            let absent = matches!(accessor.read(&*owner), Err(AccessErrorKind::Absent));
            if absent {
                if !can_instantiate {
                    return Err(err_at(AccessErrorKind::Absent, path, depth, shape));
                }
                let fresh = child
                    .create_default()
                    .ok_or_else(|| err_at(AccessErrorKind::Absent, path, depth, shape))?;
                accessor
                    .write(owner, fresh)
                    .map_err(|kind| err_at(kind, path, depth, shape))?;
            }
            let target = accessor
                .read_mut(owner)
                .map_err(|kind| err_at(kind, path, depth, shape))?;
            self.apply_in(target, path, depth + 1, terminal)
        }
    }

    fn apply_terminal(
        &self,
        owner: &mut dyn Node,
        shape: &'static ShapeInfo,
        path: &NodePath,
        depth: usize,
        terminal: Terminal,
    ) -> Result<(), AccessError> {
        let segment = &path.segments()[depth];
        match terminal {
            Terminal::Set(value, want) => {
                let accessor = self
                    .cache
                    .get_or_compile(shape, segment, &want)
                    .map_err(|kind| err_at(kind, path, depth, shape))?;
                accessor
                    .write(owner, value)
                    .map_err(|kind| err_at(kind, path, depth, shape))
            }
            Terminal::Remove => self.remove_terminal(owner, shape, path, depth),
            Terminal::Ensure => {
                let accessor = self
                    .cache
                    .get_or_compile(shape, segment, &ValueShape::Any)
                    .map_err(|kind| err_at(kind, path, depth, shape))?;
                let present = match accessor.read(&*owner) {
                    Ok(_) => true,
                    Err(AccessErrorKind::Absent) => false,
                    Err(kind) => return Err(err_at(kind, path, depth, shape)),
                };
                if present {
                    return Ok(());
                }
                let child = accessor.child();
                if !accessor.is_optional() || !child.has_default() {
                    return Err(err_at(AccessErrorKind::Absent, path, depth, shape));
                }
                let fresh = child
                    .create_default()
                    .ok_or_else(|| err_at(AccessErrorKind::Absent, path, depth, shape))?;
                accessor
                    .write(owner, fresh)
                    .map_err(|kind| err_at(kind, path, depth, shape))
            }
        }
    }

    fn remove_terminal(
        &self,
        owner: &mut dyn Node,
        shape: &'static ShapeInfo,
        path: &NodePath,
        depth: usize,
    ) -> Result<(), AccessError> {
        let segment = &path.segments()[depth];
        let fail = |kind| err_at(kind, path, depth, shape);

        match (segment, owner.node_mut()) {
            (Segment::Index(index), NodeMut::Sequence(sequence)) => {
                let len = sequence.len();
                if *index >= len {
                    return Err(fail(AccessErrorKind::IndexOutOfRange { index: *index, len }));
                }
                sequence.remove_element(*index);
                Ok(())
            }
            (Segment::Index(_), _) => Err(fail(AccessErrorKind::IndexingNotSupported {
                kind: shape.kind(),
            })),
            (Segment::Field(name), NodeMut::Object(object)) => {
                let member = shape.member(name).ok_or_else(|| {
                    fail(AccessErrorKind::MemberNotFound {
                        member: name.as_ref().into(),
                        owner: shape.name(),
                    })
                })?;
                if !member.is_writable() {
                    return Err(fail(AccessErrorKind::ReadOnlyMember {
                        member: member.name().into(),
                    }));
                }
                if member.is_optional() {
                    object.clear_member(member.name());
                    Ok(())
                } else if let Some(fresh) = member.shape().create_default() {
                    object
                        .set_member(member.name(), fresh)
                        .map_err(|_| fail(AccessErrorKind::IncompatibleKind))
                } else {
                    Err(fail(AccessErrorKind::InvalidOperation(
                        "member is required and its shape has no default".into(),
                    )))
                }
            }
            (Segment::Field(name), _) => Err(fail(AccessErrorKind::MemberNotFound {
                member: name.as_ref().into(),
                owner: shape.name(),
            })),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Navigator;
    use crate::access::error::AccessErrorKind;
    use crate::path::NodePath;
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;

    use crate::derive::NodeShape;

    #[derive(NodeShape, Clone, Default)]
    #[node(value)]
    struct Vec2 {
        x: f32,
        y: f32,
    }

    #[derive(NodeShape, Clone, Default)]
    #[node(value)]
    struct Transform {
        position: Vec2,
        rotation: f32,
    }

    #[derive(NodeShape, Clone, Default)]
    #[node(default)]
    struct Meta {
        note: String,
    }

    #[derive(NodeShape, Clone)]
    struct Item {
        value: i32,
        #[node(readonly)]
        id: u32,
    }

    #[derive(NodeShape, Clone)]
    struct Root {
        name: String,
        items: Vec<Item>,
        transform: Transform,
        meta: Option<Meta>,
        spare: Option<Item>,
        #[node(skip)]
        revision: u64,
    }

    fn sample() -> Root {
        Root {
            name: "A".into(),
            items: vec![
                Item { value: 1, id: 10 },
                Item { value: 2, id: 20 },
            ],
            transform: Transform::default(),
            meta: None,
            spare: None,
            revision: 0,
        }
    }

    fn path(text: &str) -> NodePath {
        NodePath::parse(text).unwrap()
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut root = sample();
        let nav = Navigator::new();
        let target = path("items[1].value");

        assert_eq!(nav.get::<i32>(&root, &target).unwrap(), 2);
        nav.set(&mut root, &target, 9_i32).unwrap();
        assert_eq!(root.items[1].value, 9);
        assert_eq!(nav.get::<i32>(&root, &target).unwrap(), 9);
    }

    #[test]
    fn identity_path_reads_the_root() {
        let root = sample();
        let nav = Navigator::new();
        let fetched = nav.get::<Root>(&root, &NodePath::identity()).unwrap();
        assert_eq!(fetched.name, "A");
    }

    #[test]
    fn index_out_of_range() {
        let mut root = sample();
        let nav = Navigator::new();
        let target = path("items[5].value");

        let err = nav.get::<i32>(&root, &target).unwrap_err();
        assert_eq!(err.path().to_string(), "items[5]");
        assert!(matches!(
            err.kind(),
            AccessErrorKind::IndexOutOfRange { index: 5, len: 2 }
        ));
        assert!(nav.set(&mut root, &target, 1_i32).is_err());
    }

    #[test]
    fn member_not_found_reports_sub_path() {
        let root = sample();
        let nav = Navigator::new();
        let err = nav
            .get::<i32>(&root, &path("items[0].missing"))
            .unwrap_err();

        assert_eq!(err.path().to_string(), "items[0].missing");
        assert!(matches!(err.kind(), AccessErrorKind::MemberNotFound { .. }));
    }

    #[test]
    fn remove_shifts_sequence_elements() {
        let mut root = sample();
        let nav = Navigator::new();

        nav.remove(&mut root, &path("items[0]")).unwrap();
        assert_eq!(root.items.len(), 1);
        assert_eq!(root.items[0].id, 20);

        let err = nav.remove(&mut root, &path("items[3]")).unwrap_err();
        assert!(matches!(
            err.kind(),
            AccessErrorKind::IndexOutOfRange { index: 3, len: 1 }
        ));
    }

    #[test]
    fn copy_back_through_value_semantics() {
        let mut root = sample();
        let nav = Navigator::new();

        // Two value-typed hops: Transform and Vec2 are both copy-out shapes.
        nav.set(&mut root, &path("transform.position.x"), 4.5_f32)
            .unwrap();
        assert_eq!(root.transform.position.x, 4.5);
        assert_eq!(root.transform.position.y, 0.0);

        nav.set(&mut root, &path("transform.rotation"), 90.0_f32)
            .unwrap();
        assert_eq!(root.transform.rotation, 90.0);
    }

    #[test]
    fn value_semantics_reads_are_copies() {
        let root = sample();
        let nav = Navigator::new();

        let mut copy = nav
            .get::<Transform>(&root, &path("transform"))
            .unwrap();
        copy.rotation = 45.0;
        assert_eq!(copy.rotation, 45.0);
        assert_eq!(root.transform.rotation, 0.0);
    }

    #[test]
    fn auto_instantiates_absent_optionals_on_write() {
        let mut root = sample();
        let nav = Navigator::new();

        assert!(root.meta.is_none());
        nav.set(&mut root, &path("meta.note"), String::from("hi"))
            .unwrap();
        assert_eq!(root.meta.as_ref().unwrap().note, "hi");
    }

    #[test]
    fn reads_never_instantiate() {
        let root = sample();
        let nav = Navigator::new();

        let err = nav.get::<String>(&root, &path("meta.note")).unwrap_err();
        assert!(matches!(err.kind(), AccessErrorKind::Absent));
        assert!(root.meta.is_none());
    }

    #[test]
    fn ensure_and_remove_optional_members() {
        let mut root = sample();
        let nav = Navigator::new();

        nav.ensure(&mut root, &path("meta")).unwrap();
        assert!(root.meta.is_some());

        nav.remove(&mut root, &path("meta")).unwrap();
        assert!(root.meta.is_none());
    }

    #[test]
    fn ensure_requires_a_default() {
        let mut root = sample();
        let nav = Navigator::new();

        // `Item` registers no default, so the absent member stays absent.
        let err = nav.ensure(&mut root, &path("spare")).unwrap_err();
        assert!(matches!(err.kind(), AccessErrorKind::Absent));
        assert!(root.spare.is_none());
    }

    #[test]
    fn remove_resets_defaultable_members() {
        let mut root = sample();
        let nav = Navigator::new();

        nav.set(&mut root, &path("name"), String::from("B")).unwrap();
        nav.remove(&mut root, &path("name")).unwrap();
        assert_eq!(root.name, "");
    }

    #[test]
    fn readonly_members_refuse_writes() {
        let mut root = sample();
        let nav = Navigator::new();

        let err = nav
            .set(&mut root, &path("items[0].id"), 99_u32)
            .unwrap_err();
        assert!(matches!(err.kind(), AccessErrorKind::ReadOnlyMember { .. }));
        assert_eq!(root.items[0].id, 10);
    }

    #[test]
    fn skipped_members_are_invisible() {
        let root = sample();
        let nav = Navigator::new();

        let err = nav.get::<u64>(&root, &path("revision")).unwrap_err();
        assert!(matches!(err.kind(), AccessErrorKind::MemberNotFound { .. }));
    }

    #[test]
    fn type_mismatch_on_set() {
        let mut root = sample();
        let nav = Navigator::new();

        let err = nav
            .set(&mut root, &path("items[0].value"), true)
            .unwrap_err();
        assert!(matches!(err.kind(), AccessErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn numeric_conversions_route_through_f64() {
        let mut root = sample();
        let nav = Navigator::new();

        assert_eq!(
            nav.get::<f64>(&root, &path("items[0].value")).unwrap(),
            1.0
        );
        nav.set(&mut root, &path("items[0].value"), 7.0_f64).unwrap();
        assert_eq!(root.items[0].value, 7);
    }

    #[test]
    fn get_or_falls_back() {
        let root = sample();
        let nav = Navigator::new();

        assert_eq!(nav.get_or(&root, &path("items[0].value"), -1_i32), 1);
        assert_eq!(nav.get_or(&root, &path("items[9].value"), -1_i32), -1);
    }

    #[test]
    fn value_root_cannot_be_set_in_place() {
        let mut root = 5_i32;
        let nav = Navigator::new();

        let err = nav
            .set_boxed(&mut root, &NodePath::identity(), Box::new(6_i32))
            .unwrap_err();
        assert!(matches!(err.kind(), AccessErrorKind::InvalidOperation(_)));
        assert_eq!(root, 5);
    }

    #[test]
    fn reference_root_can_be_replaced() {
        let mut root = sample();
        let nav = Navigator::new();

        let mut other = sample();
        other.name = "B".into();
        nav.set(&mut root, &NodePath::identity(), other).unwrap();
        assert_eq!(root.name, "B");
    }

    #[test]
    fn set_through_untyped_box() {
        let mut root = sample();
        let nav = Navigator::new();

        nav.set_boxed(&mut root, &path("items[1].value"), Box::new(3_i32))
            .unwrap();
        assert_eq!(root.items[1].value, 3);
    }

    #[test]
    fn repeated_walks_reuse_the_cache() {
        let mut root = sample();
        let nav = Navigator::new();
        let target = path("items[0].value");

        nav.set(&mut root, &target, 2_i32).unwrap();
        let warmed = nav.cache().len();
        nav.set(&mut root, &target, 3_i32).unwrap();
        assert_eq!(nav.cache().len(), warmed);
    }
}
