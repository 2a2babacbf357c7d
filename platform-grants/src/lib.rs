//! # Platform Grants
//!
//! Rule-graph role-based access control for the Relay platform.
//!
//! ## Overview
//!
//! Access is declared as flat grant rules: "`a` can `b`", optionally gated
//! by a condition evaluated against a caller-supplied context. Roles and
//! permissions live in one identifier namespace, so a permission can itself
//! be granted to another permission.
//!
//! Answering "can role R exercise permission P under context C?" goes through:
//! - **Rules**: the immutable rule list, indexed by source identifier
//! - **Tree**: everything reachable from R, expanded from the rules
//! - **Paths**: every route from R down to P, shortest first
//! - **Evaluator**: walks one path, evaluating each edge's condition
//! - **Cache**: optional per-engine memoization of trees and paths
//! - **Engine**: tries the paths in order; the first one that grants wins
//!
//! ## Architecture
//!
//! ```text
//! rules ──▶ tree ──▶ paths ──▶ engine ──▶ evaluator ──▶ conditions
//!                      ▲          │
//!                      └─ cache ◀─┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use platform_grants::{condition, Context, Rbac, Rule};
//!
//! async fn example() -> platform_grants::GrantResult<()> {
//!     let rules = vec![
//!         Rule::new("admin", "user"),
//!         Rule::new("user", "read articles"),
//!         Rule::new("user", "delete article").when(condition::from_async(|ctx: Context| async move {
//!             Ok::<_, platform_grants::ConditionError>(ctx.get_i64("userId") == Some(3))
//!         })),
//!     ];
//!
//!     let rbac = Rbac::new(rules, false, true);
//!
//!     assert!(rbac.check_default("admin", "read articles").await?);
//!     assert!(rbac.check("user", "delete article", &Context::new().with("userId", 3)).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Short-circuiting
//!
//! By default a path is granted as soon as an unconditioned edge is
//! reached: holding `admin` unconditionally is enough, whatever gates sit
//! further down. With `check_full_path` every gate on the path is evaluated.
//!
//! ## Failures
//!
//! `Ok(false)` means "not permitted". An `Err` means the answer could not be
//! determined, either because a condition failed or because the rule graph
//! reachable from the role contains a cycle.

pub mod cache;
pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod paths;
pub mod rules;
pub mod tree;

// Re-export main types for convenience
pub use cache::CacheStats;
pub use condition::{Completion, Condition, Context};
pub use config::RbacConfig;
pub use engine::Rbac;
pub use error::{ConditionError, GrantError, GrantResult};
pub use paths::Path;
pub use rules::{Rule, RuleDef, RuleIndex};
pub use tree::Node;
