use alloc::vec::Vec;

use crate::access::navigate::Navigator;
use crate::node::{Node, NodeKind, NodeRef};
use crate::path::NodePath;

// -----------------------------------------------------------------------------
// Collection

impl Navigator {
    /// Enumerates the graph-node entities reachable under `root`, paired
    /// with the path that addresses each one.
    ///
    /// The root itself is never emitted, even when its own shape is flagged
    /// as a graph node. `max_depth` bounds how far the walk descends *below*
    /// a collected node: `0` collects matches without looking inside them,
    /// `1` additionally collects matches nested one entity deep, and a
    /// negative value removes the bound entirely. Descent through shapes
    /// that are not graph nodes is free.
    ///
    /// # Examples
    ///
    /// ```
    /// use nl_access::{Navigator, derive::NodeShape};
    ///
    /// #[derive(NodeShape, Clone)]
    /// #[node(graph_node)]
    /// struct Widget {
    ///     children: Vec<Widget>,
    /// }
    ///
    /// #[derive(NodeShape, Clone)]
    /// struct Canvas {
    ///     widgets: Vec<Widget>,
    /// }
    ///
    /// let canvas = Canvas {
    ///     widgets: vec![Widget {
    ///         children: vec![Widget { children: vec![] }],
    ///     }],
    /// };
    /// let nav = Navigator::new();
    ///
    /// let all = nav.collect(&canvas, -1);
    /// assert_eq!(all.len(), 2);
    /// assert_eq!(all[0].0.to_string(), "widgets[0]");
    /// assert_eq!(all[1].0.to_string(), "widgets[0].children[0]");
    ///
    /// let shallow = nav.collect(&canvas, 0);
    /// assert_eq!(shallow.len(), 1);
    /// ```
    pub fn collect<'r>(&self, root: &'r dyn Node, max_depth: i32) -> Vec<(NodePath, &'r dyn Node)> {
        let mut out = Vec::new();
        let prefix = NodePath::identity();
        if let Some(nav) = root.as_navigable() {
            nav.nav_collect(&prefix, max_depth, &mut out);
        } else {
            collect_into(root, &prefix, max_depth, &mut out);
        }
        out
    }
}

/// Walks the children of `node`, emitting graph-node entities.
fn collect_into<'r>(
    node: &'r dyn Node,
    prefix: &NodePath,
    budget: i32,
    out: &mut Vec<(NodePath, &'r dyn Node)>,
) {
    match node.node_ref() {
        NodeRef::Object(object) => {
            for at in 0..object.member_len() {
                // Absent optional members are simply skipped.
                let (Some(name), Some(child)) = (object.member_name_at(at), object.member_at(at))
                else {
                    continue;
                };
                visit(child, prefix.append(name), budget, out);
            }
        }
        NodeRef::Sequence(sequence) => {
            // Interiors of sequence-of-sequence shapes are unaddressable.
            if node
                .shape()
                .element_shape()
                .is_some_and(|element| element.kind() == NodeKind::Sequence)
            {
                return;
            }
            for index in 0..sequence.len() {
                let Some(child) = sequence.element(index) else {
                    continue;
                };
                visit(child, prefix.append_index(index), budget, out);
            }
        }
        NodeRef::Leaf(_) => {}
    }
}

fn visit<'r>(
    child: &'r dyn Node,
    child_path: NodePath,
    budget: i32,
    out: &mut Vec<(NodePath, &'r dyn Node)>,
) {
    let mut budget = budget;
    if child.is_graph_node() {
        out.push((child_path.clone(), child));
        if budget == 0 {
            return;
        }
        if budget > 0 {
            budget -= 1;
        }
    }
    if let Some(nav) = child.as_navigable() {
        nav.nav_collect(&child_path, budget, out);
    } else {
        collect_into(child, &child_path, budget, out);
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Navigator;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::derive::NodeShape;

    #[derive(NodeShape, Clone)]
    #[node(graph_node)]
    struct GraphNode {
        label: String,
        children: Vec<GraphNode>,
    }

    #[derive(NodeShape, Clone)]
    struct Document {
        title: String,
        nodes: Vec<GraphNode>,
        grid: Vec<Vec<i32>>,
    }

    fn leaf(label: &str) -> GraphNode {
        GraphNode {
            label: label.into(),
            children: vec![],
        }
    }

    fn sample() -> Document {
        Document {
            title: "doc".into(),
            nodes: vec![
                GraphNode {
                    label: "a".into(),
                    children: vec![leaf("a0"), leaf("a1")],
                },
                leaf("b"),
            ],
            grid: vec![vec![1, 2], vec![3]],
        }
    }

    fn labels(found: &[(crate::path::NodePath, &dyn crate::node::Node)]) -> Vec<String> {
        found.iter().map(|(path, _)| path.to_string()).collect()
    }

    #[test]
    fn unbounded_collection_is_depth_first() {
        let doc = sample();
        let nav = Navigator::new();

        let found = nav.collect(&doc, -1);
        assert_eq!(
            labels(&found),
            [
                "nodes[0]",
                "nodes[0].children[0]",
                "nodes[0].children[1]",
                "nodes[1]",
            ]
        );
    }

    #[test]
    fn depth_zero_does_not_look_inside_matches() {
        let doc = sample();
        let nav = Navigator::new();

        let found = nav.collect(&doc, 0);
        assert_eq!(labels(&found), ["nodes[0]", "nodes[1]"]);
    }

    #[test]
    fn depth_one_descends_one_entity_level() {
        let doc = sample();
        let nav = Navigator::new();

        let found = nav.collect(&doc, 1);
        assert_eq!(
            labels(&found),
            [
                "nodes[0]",
                "nodes[0].children[0]",
                "nodes[0].children[1]",
                "nodes[1]",
            ]
        );
    }

    #[test]
    fn root_is_never_emitted() {
        let root = GraphNode {
            label: "root".into(),
            children: vec![leaf("x")],
        };
        let nav = Navigator::new();

        let found = nav.collect(&root, -1);
        assert_eq!(labels(&found), ["children[0]"]);
    }

    #[test]
    fn collected_paths_resolve_back_to_the_entity() {
        let doc = sample();
        let nav = Navigator::new();

        for (path, node) in nav.collect(&doc, -1) {
            let resolved = nav.get_ref(&doc, &path).unwrap();
            let resolved = resolved as *const dyn crate::node::Node as *const ();
            let node = node as *const dyn crate::node::Node as *const ();
            assert!(core::ptr::eq(resolved, node));
        }
    }

    #[test]
    fn nested_sequences_are_skipped() {
        let doc = sample();
        let nav = Navigator::new();

        // Nothing under `grid` is reachable, and the walk does not fail.
        let found = nav.collect(&doc, -1);
        assert!(found.iter().all(|(path, _)| !path.as_str().starts_with("grid")));
    }
}
