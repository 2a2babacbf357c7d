//! # Paths
//!
//! Enumerates the routes from a tree's root down to a queried permission.

use std::sync::Arc;

use crate::tree::Node;

/// A root-to-target sequence of tree nodes, both endpoints included.
#[derive(Debug, Clone)]
pub struct Path(Vec<Arc<Node>>);

impl Path {
    /// Number of nodes on the path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty. Paths produced by [`find_paths`] never are.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The nodes, root first.
    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.0
    }

    /// The identifiers along the path, root first.
    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|n| n.value.as_str()).collect()
    }
}

impl From<Vec<Arc<Node>>> for Path {
    fn from(nodes: Vec<Arc<Node>>) -> Self {
        Self(nodes)
    }
}

/// Find every path from `root` to a node whose value is `permission`.
///
/// Paths come back in discovery order (depth first, children in declaration
/// order). A root that already equals `permission` yields the single
/// one-node path and its subtree is not searched. No match gives an empty list.
pub fn find_paths(root: &Arc<Node>, permission: &str) -> Vec<Path> {
    let mut found = Vec::new();
    let mut trail = Vec::new();
    collect(root, permission, &mut trail, &mut found);
    found
}

/// [`find_paths`], then stably sorted by ascending node count.
///
/// Equal-length paths keep their discovery order.
pub fn find_sorted_paths(root: &Arc<Node>, permission: &str) -> Vec<Path> {
    let mut paths = find_paths(root, permission);
    paths.sort_by_key(Path::len);
    paths
}

fn collect(node: &Arc<Node>, permission: &str, trail: &mut Vec<Arc<Node>>, found: &mut Vec<Path>) {
    trail.push(Arc::clone(node));

    if node.value == permission {
        found.push(Path(trail.clone()));
    } else {
        for child in &node.children {
            collect(child, permission, trail, found);
        }
    }

    trail.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, RuleIndex};
    use crate::tree::build_tree;

    fn tree(rules: Vec<Rule>, role: &str) -> Arc<Node> {
        build_tree(role, &RuleIndex::from_rules(rules)).unwrap()
    }

    #[test]
    fn test_root_matches_itself() {
        let root = tree(vec![Rule::new("admin", "user")], "admin");
        let paths = find_paths(&root, "admin");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].ids(), vec!["admin"]);
    }

    #[test]
    fn test_no_path() {
        let root = tree(vec![Rule::new("admin", "user")], "user");
        assert!(find_paths(&root, "admin").is_empty());
    }

    #[test]
    fn test_discovery_order() {
        let root = tree(
            vec![
                Rule::new("visitor", "read articles"),
                Rule::new("user", "visitor"),
                Rule::new("user", "read articles"),
            ],
            "user",
        );

        let paths = find_paths(&root, "read articles");
        let ids: Vec<Vec<&str>> = paths.iter().map(Path::ids).collect();
        assert_eq!(
            ids,
            vec![
                vec!["user", "visitor", "read articles"],
                vec!["user", "read articles"],
            ]
        );
    }

    #[test]
    fn test_sorted_shortest_first_and_stable() {
        let root = tree(
            vec![
                Rule::new("a", "b"),
                Rule::new("b", "target"),
                Rule::new("a", "c"),
                Rule::new("c", "target"),
                Rule::new("a", "target"),
            ],
            "a",
        );

        let paths = find_sorted_paths(&root, "target");
        let ids: Vec<Vec<&str>> = paths.iter().map(Path::ids).collect();
        assert_eq!(
            ids,
            vec![
                vec!["a", "target"],
                vec!["a", "b", "target"],
                vec!["a", "c", "target"],
            ]
        );
    }

    #[test]
    fn test_search_stops_at_match() {
        let root = tree(
            vec![Rule::new("admin", "user"), Rule::new("user", "visitor")],
            "admin",
        );
        let paths = find_paths(&root, "user");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 2);
    }
}
