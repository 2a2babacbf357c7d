//! # Engine
//!
//! The check orchestrator: builds (or fetches) the grant tree for a role,
//! finds the candidate paths to a permission shortest first, and evaluates
//! them in order until one grants.

use std::sync::Arc;
use tracing::{debug, instrument, trace};

use crate::cache::{CacheStats, TreeCache};
use crate::condition::Context;
use crate::config::RbacConfig;
use crate::error::GrantResult;
use crate::evaluator::evaluate_path;
use crate::paths::{find_sorted_paths, Path};
use crate::rules::{Rule, RuleIndex};
use crate::tree::{build_tree, Node};

/// Rule-graph permission evaluator.
///
/// # Example
///
/// ```
/// use platform_grants::{condition, Context, Rbac, Rule};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let rbac = Rbac::new(
///     vec![
///         Rule::new("admin", "user"),
///         Rule::new("user", "read articles"),
///         Rule::new("user", "edit article")
///             .when(condition::predicate(|ctx: &Context| ctx.get_i64("userId") == Some(2))),
///     ],
///     false,
///     true,
/// );
///
/// assert!(rbac.check_default("admin", "read articles").await.unwrap());
/// assert!(!rbac.check_default("user", "edit article").await.unwrap());
///
/// let ctx = Context::new().with("userId", 2);
/// assert!(rbac.check("user", "edit article", &ctx).await.unwrap());
/// # });
/// ```
#[derive(Debug)]
pub struct Rbac {
    rules: RuleIndex,
    config: RbacConfig,
    cache: Option<TreeCache>,
}

impl Rbac {
    /// Create an engine over a fixed rule list.
    ///
    /// # Arguments
    ///
    /// * `rules` - Grant rules, in declaration order
    /// * `check_full_path` - Evaluate every gate on a path
    /// * `cache_trees` - Memoize trees and paths
    pub fn new(rules: Vec<Rule>, check_full_path: bool, cache_trees: bool) -> Self {
        Self::with_config(
            rules,
            RbacConfig {
                check_full_path,
                cache_trees,
            },
        )
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(rules: Vec<Rule>, config: RbacConfig) -> Self {
        Self {
            rules: RuleIndex::from_rules(rules),
            config,
            cache: config.cache_trees.then(TreeCache::new),
        }
    }

    /// Whether every gate on a path is evaluated.
    pub fn check_full_path(&self) -> bool {
        self.config.check_full_path
    }

    /// Whether trees and paths are memoized.
    pub fn caches_trees(&self) -> bool {
        self.cache.is_some()
    }

    /// Number of rules the engine was built with.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// The engine's configuration.
    pub fn config(&self) -> &RbacConfig {
        &self.config
    }

    /// Check whether `role` holds `permission` under `ctx`.
    ///
    /// Candidate paths are tried one at a time, shortest first; the first
    /// path that evaluates to `true` wins. No path at all is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// A condition failure aborts the check immediately, without trying the
    /// remaining paths. A cyclic rule graph reachable from `role` is reported
    /// before any condition runs.
    #[instrument(level = "debug", skip(self, ctx))]
    pub async fn check(&self, role: &str, permission: &str, ctx: &Context) -> GrantResult<bool> {
        let paths = self.get_paths(role, permission).await?;

        for (idx, path) in paths.iter().enumerate() {
            if evaluate_path(path, ctx, self.config.check_full_path).await? {
                debug!(path = idx, hops = path.len() - 1, "Permission granted");
                return Ok(true);
            }
        }

        debug!(candidates = paths.len(), "Permission denied");
        Ok(false)
    }

    /// [`check`](Self::check) with an empty context.
    pub async fn check_default(&self, role: &str, permission: &str) -> GrantResult<bool> {
        self.check(role, permission, &Context::default()).await
    }

    /// [`check`](Self::check), handing the outcome to a completion handler.
    ///
    /// ```
    /// use platform_grants::{Context, Rbac, Rule};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let rbac = Rbac::new(vec![Rule::new("admin", "user")], false, false);
    /// let verdict = rbac
    ///     .check_with("admin", "user", &Context::new(), |res| match res {
    ///         Ok(true) => "allowed",
    ///         Ok(false) => "denied",
    ///         Err(_) => "unknown",
    ///     })
    ///     .await;
    /// assert_eq!(verdict, "allowed");
    /// # });
    /// ```
    pub async fn check_with<F, R>(&self, role: &str, permission: &str, ctx: &Context, done: F) -> R
    where
        F: FnOnce(GrantResult<bool>) -> R,
    {
        done(self.check(role, permission, ctx).await)
    }

    /// Grant tree rooted at `role`, from cache when enabled.
    pub async fn get_tree(&self, role: &str) -> GrantResult<Arc<Node>> {
        debug!(role, "getTree");

        let Some(cache) = &self.cache else {
            return build_tree(role, &self.rules);
        };

        if let Some(tree) = cache.tree(role).await {
            trace!(role, "Tree cache hit");
            return Ok(tree);
        }

        trace!(role, "Tree cache miss, building");
        let tree = build_tree(role, &self.rules)?;
        Ok(cache.insert_tree(role, tree).await)
    }

    /// Candidate paths from `role` to `permission`, shortest first, from
    /// cache when enabled.
    pub async fn get_paths(&self, role: &str, permission: &str) -> GrantResult<Arc<Vec<Path>>> {
        debug!(role, permission, "getPaths");

        if let Some(cache) = &self.cache {
            if let Some(paths) = cache.paths(role, permission).await {
                trace!(role, permission, "Path cache hit");
                return Ok(paths);
            }
        }

        let tree = self.get_tree(role).await?;
        let paths = Arc::new(find_sorted_paths(&tree, permission));

        match &self.cache {
            Some(cache) => Ok(cache.insert_paths(role, permission, paths).await),
            None => Ok(paths),
        }
    }

    /// Cache occupancy; `None` when caching is disabled.
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        match &self.cache {
            Some(cache) => Some(cache.stats().await),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{fallible, predicate, ConditionError};
    use crate::error::GrantError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_accessors() {
        let rbac = Rbac::new(vec![Rule::new("admin", "user")], true, false);
        assert!(rbac.check_full_path());
        assert!(!rbac.caches_trees());
        assert_eq!(rbac.rule_count(), 1);
        assert!(rbac.cache_stats().await.is_none());
        assert_eq!(
            rbac.config(),
            &RbacConfig {
                check_full_path: true,
                cache_trees: false,
            }
        );

        let cached = Rbac::with_config(vec![], RbacConfig::cached());
        assert_eq!(cached.config(), &RbacConfig::cached());
        assert!(cached.caches_trees());
    }

    #[tokio::test]
    async fn test_role_holds_itself() {
        let rbac = Rbac::new(vec![], false, false);
        assert!(rbac.check_default("admin", "admin").await.unwrap());
        assert!(!rbac.check_default("admin", "user").await.unwrap());
    }

    #[tokio::test]
    async fn test_falls_through_to_next_path() {
        // Shortest path is gated and fails; the longer ungated one grants.
        let rbac = Rbac::new(
            vec![
                Rule::new("user", "publish").when(predicate(|_: &Context| false)),
                Rule::new("user", "editor"),
                Rule::new("editor", "publish"),
            ],
            false,
            false,
        );
        assert!(rbac.check_default("user", "publish").await.unwrap());
    }

    #[tokio::test]
    async fn test_error_stops_remaining_paths() {
        let later = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later);
        let rbac = Rbac::new(
            vec![
                Rule::new("user", "publish")
                    .when(fallible(|_: &Context| Err(ConditionError::new("lookup failed")))),
                Rule::new("user", "editor"),
                Rule::new("editor", "publish").when(predicate(move |_: &Context| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    true
                })),
            ],
            true,
            false,
        );

        let err = rbac.check_default("user", "publish").await.unwrap_err();
        assert!(err.is_condition_failure());
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cycle_surfaces_as_error() {
        let rbac = Rbac::new(
            vec![Rule::new("a", "b"), Rule::new("b", "a")],
            false,
            false,
        );
        let err = rbac.check_default("a", "c").await.unwrap_err();
        assert!(matches!(err, GrantError::CyclicRuleGraph { .. }));
    }

    #[tokio::test]
    async fn test_cache_populates_once() {
        let rbac = Rbac::with_config(
            vec![Rule::new("admin", "user"), Rule::new("user", "visitor")],
            RbacConfig::cached(),
        );

        let first = rbac.get_paths("admin", "visitor").await.unwrap();
        let second = rbac.get_paths("admin", "visitor").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let tree = rbac.get_tree("admin").await.unwrap();
        assert!(Arc::ptr_eq(&tree, &rbac.get_tree("admin").await.unwrap()));

        rbac.check_default("admin", "user").await.unwrap();
        let stats = rbac.cache_stats().await.unwrap();
        assert_eq!(stats, CacheStats { trees: 1, path_sets: 2 });
    }

    #[tokio::test]
    async fn test_uncached_rebuilds() {
        let rbac = Rbac::new(vec![Rule::new("admin", "user")], false, false);
        let first = rbac.get_tree("admin").await.unwrap();
        let second = rbac.get_tree("admin").await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_check_with_receives_error() {
        let rbac = Rbac::new(
            vec![Rule::new("user", "x")
                .when(fallible(|_: &Context| Err(ConditionError::new("boom"))))],
            false,
            false,
        );
        let code = rbac
            .check_with("user", "x", &Context::new(), |res| {
                res.map_err(|e| e.error_code())
            })
            .await;
        assert_eq!(code, Err("CONDITION_FAILED"));
    }
}
