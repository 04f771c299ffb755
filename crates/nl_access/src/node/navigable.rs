use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::access::{AccessError, PathCheck};
use crate::node::Node;
use crate::path::NodePath;

// -----------------------------------------------------------------------------
// Navigable

/// The delegation protocol for shapes that manage their own interior.
///
/// Some shapes cannot expose their structure through the member/element
/// tables the compiler works from: values stored behind a custom container,
/// sequences of sequences, shapes whose layout is only known at runtime.
/// Such a shape returns itself from [`Node::as_navigable`], and the engine
/// hands it the *remaining* path whenever segments are left to resolve at
/// that hop.
///
/// Implementations receive the full path plus the index of the first segment
/// they own (`start`), and are responsible for everything from there on,
/// including raising the same errors the engine would. Errors should be
/// reported against `path.slice(0, failed + 1)` so callers see the offending
/// sub-path regardless of who resolved it.
pub trait Navigable: Node {
    /// Resolves `path[start..]` against this node and returns the target.
    fn nav_get<'r>(&'r self, path: &NodePath, start: usize) -> Result<&'r dyn Node, AccessError>;

    /// Resolves `path[start..]` and writes `value` at the target.
    fn nav_set(
        &mut self,
        path: &NodePath,
        start: usize,
        value: Box<dyn Node>,
    ) -> Result<(), AccessError>;

    /// Resolves `path[start..]` and removes or resets the target.
    fn nav_remove(&mut self, path: &NodePath, start: usize) -> Result<(), AccessError>;

    /// Reports how far `path[start..]` resolves without touching data.
    fn nav_validate(&self, path: &NodePath, start: usize) -> PathCheck;

    /// Appends the graph-node entities reachable under this node to `out`.
    ///
    /// `prefix` is the absolute path of this node; emitted paths must extend
    /// it. `budget` follows the engine's depth discipline: negative means
    /// unbounded, zero means collect matches but do not descend below them,
    /// and positive values are decremented per level below a collected node.
    fn nav_collect<'r>(
        &'r self,
        prefix: &NodePath,
        budget: i32,
        out: &mut Vec<(NodePath, &'r dyn Node)>,
    );
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;

    use nl_utils::hash::HashMap;

    use super::Navigable;
    use crate::access::{AccessError, AccessErrorKind, Navigator, PathCheck};
    use crate::derive::NodeShape;
    use crate::impls::ShapeCell;
    use crate::info::{ShapeInfo, Shaped};
    use crate::node::{Node, NodeMut, NodeRef};
    use crate::path::{NodePath, Segment};

    /// Stores `i32` values behind runtime-known names, so it cannot declare a
    /// member table and resolves the remaining path itself.
    #[derive(Clone, Default)]
    struct Registry {
        entries: HashMap<String, i32>,
    }

    impl Registry {
        fn err(&self, kind: AccessErrorKind, path: &NodePath, failed: usize) -> AccessError {
            AccessError::new(kind, path.slice(0, failed + 1), "Registry")
        }

        fn entry_name<'p>(
            &self,
            path: &'p NodePath,
            start: usize,
        ) -> Result<&'p str, AccessError> {
            match path.get(start) {
                Some(Segment::Field(name)) if start + 1 == path.len() => Ok(name.as_ref()),
                Some(Segment::Field(_)) => Err(self.err(
                    AccessErrorKind::InvalidOperation("registry entries have no interior".into()),
                    path,
                    start + 1,
                )),
                Some(Segment::Index(_)) => Err(self.err(
                    AccessErrorKind::IndexingNotSupported {
                        kind: crate::node::NodeKind::Leaf,
                    },
                    path,
                    start,
                )),
                None => Err(self.err(
                    AccessErrorKind::InvalidOperation("a registry entry name is required".into()),
                    path,
                    start,
                )),
            }
        }
    }

    impl Shaped for Registry {
        fn shape_info() -> &'static ShapeInfo {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| ShapeInfo::leaf::<Registry>("Registry"))
        }
    }

    impl Node for Registry {
        fn shape(&self) -> &'static ShapeInfo {
            <Self as Shaped>::shape_info()
        }

        fn node_ref(&self) -> NodeRef<'_> {
            NodeRef::Leaf(self)
        }

        fn node_mut(&mut self) -> NodeMut<'_> {
            NodeMut::Leaf(self)
        }

        fn clone_node(&self) -> Box<dyn Node> {
            Box::new(self.clone())
        }

        fn set_node(&mut self, value: Box<dyn Node>) -> Result<(), Box<dyn Node>> {
            *self = value.take::<Self>()?;
            Ok(())
        }

        fn as_navigable(&self) -> Option<&dyn Navigable> {
            Some(self)
        }

        fn as_navigable_mut(&mut self) -> Option<&mut dyn Navigable> {
            Some(self)
        }
    }

    impl Navigable for Registry {
        fn nav_get<'r>(
            &'r self,
            path: &NodePath,
            start: usize,
        ) -> Result<&'r dyn Node, AccessError> {
            let name = self.entry_name(path, start)?;
            match self.entries.get(name) {
                Some(value) => Ok(value as &dyn Node),
                None => Err(self.err(
                    AccessErrorKind::MemberNotFound {
                        member: name.into(),
                        owner: "Registry",
                    },
                    path,
                    start,
                )),
            }
        }

        fn nav_set(
            &mut self,
            path: &NodePath,
            start: usize,
            value: Box<dyn Node>,
        ) -> Result<(), AccessError> {
            let name = self.entry_name(path, start)?;
            let value = value.take::<i32>().map_err(|rejected| {
                self.err(
                    AccessErrorKind::TypeMismatch {
                        expected: "i32",
                        found: rejected.shape().name(),
                    },
                    path,
                    start,
                )
            })?;
            self.entries.insert(name.into(), value);
            Ok(())
        }

        fn nav_remove(&mut self, path: &NodePath, start: usize) -> Result<(), AccessError> {
            let name = self.entry_name(path, start)?;
            match self.entries.remove(name) {
                Some(_) => Ok(()),
                None => Err(self.err(AccessErrorKind::Absent, path, start)),
            }
        }

        fn nav_validate(&self, path: &NodePath, start: usize) -> PathCheck {
            match self.entry_name(path, start) {
                Ok(name) if self.entries.contains_key(name) => {
                    PathCheck::full(path.len() - start)
                }
                _ => PathCheck::partial(0),
            }
        }

        fn nav_collect<'r>(
            &'r self,
            _prefix: &NodePath,
            _budget: i32,
            _out: &mut Vec<(NodePath, &'r dyn Node)>,
        ) {
            // Entries are plain values, never graph-node entities.
        }
    }

    #[derive(NodeShape, Clone)]
    struct Actor {
        label: String,
        registry: Registry,
    }

    fn sample() -> Actor {
        let mut entries = HashMap::default();
        entries.insert(String::from("hp"), 10);
        entries.insert(String::from("mp"), 4);
        Actor {
            label: "actor".into(),
            registry: Registry { entries },
        }
    }

    fn path(text: &str) -> NodePath {
        NodePath::parse(text).unwrap()
    }

    #[test]
    fn delegated_reads_and_writes() {
        let mut actor = sample();
        let nav = Navigator::new();

        assert_eq!(nav.get::<i32>(&actor, &path("registry.hp")).unwrap(), 10);

        nav.set(&mut actor, &path("registry.mp"), 7_i32).unwrap();
        assert_eq!(actor.registry.entries["mp"], 7);

        // The hook can create entries the engine knows nothing about.
        nav.set(&mut actor, &path("registry.xp"), 1_i32).unwrap();
        assert_eq!(nav.get::<i32>(&actor, &path("registry.xp")).unwrap(), 1);
    }

    #[test]
    fn delegated_errors_carry_the_sub_path() {
        let mut actor = sample();
        let nav = Navigator::new();

        let err = nav.get::<i32>(&actor, &path("registry.missing")).unwrap_err();
        assert_eq!(err.path().to_string(), "registry.missing");
        assert_eq!(err.owner(), "Registry");
        assert!(matches!(err.kind(), AccessErrorKind::MemberNotFound { .. }));

        let err = nav
            .set(&mut actor, &path("registry.hp"), true)
            .unwrap_err();
        assert!(matches!(err.kind(), AccessErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn delegated_remove_and_validate() {
        let mut actor = sample();
        let nav = Navigator::new();

        nav.remove(&mut actor, &path("registry.hp")).unwrap();
        assert!(!actor.registry.entries.contains_key("hp"));

        let check = nav.validate(&actor, &path("registry.mp"));
        assert!(check.complete);
        assert_eq!(check.resolved, 2);

        let check = nav.validate(&actor, &path("registry.hp"));
        assert!(!check.complete);
        assert_eq!(check.resolved, 1);
    }

    #[test]
    fn delegated_collection_is_consulted() {
        let actor = sample();
        let nav = Navigator::new();

        // The walk reaches the hook and the hook reports no entities.
        assert!(nav.collect(&actor, -1).is_empty());
    }
}
