//! Engine configuration.
//!
//! Both switches default to off. Values can be loaded from environment
//! variables so the evaluation policy can be tuned per deployment.

use serde::{Deserialize, Serialize};

/// Evaluation and caching policy for an [`Rbac`](crate::Rbac) engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Evaluate every gate on a candidate path instead of granting at the
    /// first unconditioned edge.
    ///
    /// Needed when conditions have side effects (auditing) that must always run.
    #[serde(default)]
    pub check_full_path: bool,

    /// Memoize grant trees per role and sorted paths per (role, permission).
    ///
    /// Entries are never invalidated; the rule set is fixed for the engine's lifetime.
    #[serde(default)]
    pub cache_trees: bool,
}

impl RbacConfig {
    /// Strict evaluation with caching enabled.
    pub fn strict() -> Self {
        Self {
            check_full_path: true,
            cache_trees: true,
        }
    }

    /// Shortcut evaluation with caching enabled.
    pub fn cached() -> Self {
        Self {
            check_full_path: false,
            cache_trees: true,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RBAC_CHECK_FULL_PATH`: Evaluate every gate on a path (default: false)
    /// - `RBAC_CACHE_TREES`: Cache trees and paths (default: false)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            check_full_path: env_flag("RBAC_CHECK_FULL_PATH").unwrap_or(default.check_full_path),
            cache_trees: env_flag("RBAC_CACHE_TREES").unwrap_or(default.cache_trees),
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|s| parse_flag(&s))
}

fn parse_flag(s: &str) -> bool {
    let s = s.trim();
    !(s.is_empty() || s.eq_ignore_ascii_case("false") || s == "0")
}
