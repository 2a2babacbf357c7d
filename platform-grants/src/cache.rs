//! Instance-owned memoization of grant trees and path lists.
//!
//! Entries are computed once per key and never invalidated. The rule set is
//! assumed fixed for the owning engine's lifetime; if it changes anyway,
//! cached results go stale.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::paths::Path;
use crate::tree::Node;

/// Cache occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached trees (one per role).
    pub trees: usize,
    /// Cached path lists (one per role and permission).
    pub path_sets: usize,
}

/// Trees per role and sorted paths per (role, permission).
///
/// The lock only keeps the maps intact. Two concurrent misses on the same key
/// may both compute; the first insert is kept.
#[derive(Debug, Default)]
pub struct TreeCache {
    trees: RwLock<HashMap<String, Arc<Node>>>,
    paths: RwLock<HashMap<String, HashMap<String, Arc<Vec<Path>>>>>,
}

impl TreeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached tree for `role`.
    pub async fn tree(&self, role: &str) -> Option<Arc<Node>> {
        self.trees.read().await.get(role).cloned()
    }

    /// Store a tree, returning the entry that ends up cached.
    pub async fn insert_tree(&self, role: &str, tree: Arc<Node>) -> Arc<Node> {
        let mut trees = self.trees.write().await;
        Arc::clone(trees.entry(role.to_string()).or_insert(tree))
    }

    /// Cached paths for `(role, permission)`.
    pub async fn paths(&self, role: &str, permission: &str) -> Option<Arc<Vec<Path>>> {
        self.paths
            .read()
            .await
            .get(role)
            .and_then(|by_permission| by_permission.get(permission))
            .cloned()
    }

    /// Store paths, returning the entry that ends up cached.
    pub async fn insert_paths(
        &self,
        role: &str,
        permission: &str,
        paths: Arc<Vec<Path>>,
    ) -> Arc<Vec<Path>> {
        let mut all = self.paths.write().await;
        let by_permission = all.entry(role.to_string()).or_default();
        Arc::clone(by_permission.entry(permission.to_string()).or_insert(paths))
    }

    /// Get cache stats.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            trees: self.trees.read().await.len(),
            path_sets: self.paths.read().await.values().map(HashMap::len).sum(),
        }
    }
}
