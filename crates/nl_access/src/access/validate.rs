use crate::access::compile::ValueShape;
use crate::access::navigate::Navigator;
use crate::node::Node;
use crate::path::NodePath;

// -----------------------------------------------------------------------------
// PathCheck

/// The result of a non-destructive path check.
///
/// `resolved` counts the segments that resolved against live data, starting
/// from the root; `complete` is `true` iff every segment resolved. A check
/// never mutates anything and never auto-instantiates absent members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCheck {
    /// `true` iff the whole path resolved.
    pub complete: bool,
    /// The number of leading segments that resolved.
    pub resolved: usize,
}

impl PathCheck {
    /// A check that resolved every one of `resolved` segments.
    #[inline]
    pub fn full(resolved: usize) -> Self {
        Self {
            complete: true,
            resolved,
        }
    }

    /// A check that stopped after `resolved` segments.
    #[inline]
    pub fn partial(resolved: usize) -> Self {
        Self {
            complete: false,
            resolved,
        }
    }
}

// -----------------------------------------------------------------------------
// Validation

impl Navigator {
    /// Reports how far `path` resolves against `root` without touching data.
    ///
    /// Useful for editor tooling that wants to grey out or repair stale
    /// bindings: the returned [`PathCheck`] pinpoints the first segment that
    /// no longer resolves.
    ///
    /// # Examples
    ///
    /// ```
    /// use nl_access::{Navigator, NodePath, derive::NodeShape};
    ///
    /// #[derive(NodeShape, Clone)]
    /// struct Root {
    ///     items: Vec<i32>,
    /// }
    ///
    /// let root = Root { items: vec![1, 2] };
    /// let nav = Navigator::new();
    ///
    /// let check = nav.validate(&root, &NodePath::parse("items[1]").unwrap());
    /// assert!(check.complete);
    ///
    /// let check = nav.validate(&root, &NodePath::parse("items[9]").unwrap());
    /// assert!(!check.complete);
    /// assert_eq!(check.resolved, 1);
    /// ```
    pub fn validate(&self, root: &dyn Node, path: &NodePath) -> PathCheck {
        let mut current = root;
        for depth in 0..path.len() {
            if let Some(nav) = current.as_navigable() {
                let sub = nav.nav_validate(path, depth);
                return PathCheck {
                    complete: sub.complete,
                    resolved: depth + sub.resolved,
                };
            }
            let shape = current.shape();
            let Ok(accessor) =
                self.cache()
                    .get_or_compile(shape, &path.segments()[depth], &ValueShape::Any)
            else {
                return PathCheck::partial(depth);
            };
            match accessor.read(current) {
                Ok(next) => current = next,
                Err(_) => return PathCheck::partial(depth),
            }
        }
        PathCheck::full(path.len())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Navigator;
    use crate::path::NodePath;
    use alloc::string::String;
    use alloc::vec;

    use crate::derive::NodeShape;

    #[derive(NodeShape, Clone, Default)]
    #[node(default)]
    struct Meta {
        note: String,
    }

    #[derive(NodeShape, Clone)]
    struct Root {
        items: Vec<i32>,
        meta: Option<Meta>,
    }

    fn path(text: &str) -> NodePath {
        NodePath::parse(text).unwrap()
    }

    #[test]
    fn complete_paths() {
        let root = Root {
            items: vec![1, 2],
            meta: Some(Meta::default()),
        };
        let nav = Navigator::new();

        for text in ["", "items", "items[0]", "meta", "meta.note"] {
            let check = nav.validate(&root, &path(text));
            assert!(check.complete, "{text:?} should validate");
        }
    }

    #[test]
    fn stops_at_the_failing_segment() {
        let root = Root {
            items: vec![1, 2],
            meta: None,
        };
        let nav = Navigator::new();

        let check = nav.validate(&root, &path("items[9]"));
        assert_eq!(check.resolved, 1);

        let check = nav.validate(&root, &path("missing.anything"));
        assert_eq!(check.resolved, 0);

        // Absent optional members stop validation without instantiating.
        let check = nav.validate(&root, &path("meta.note"));
        assert!(!check.complete);
        assert_eq!(check.resolved, 0);
        assert!(root.meta.is_none());
    }

    #[test]
    fn validation_agrees_with_reads() {
        let root = Root {
            items: vec![7],
            meta: None,
        };
        let nav = Navigator::new();

        for text in ["items[0]", "items[1]", "meta", "meta.note", "items[0].x"] {
            let target = path(text);
            let check = nav.validate(&root, &target);
            assert_eq!(check.complete, nav.get_ref(&root, &target).is_ok(), "{text:?}");
        }
    }
}
