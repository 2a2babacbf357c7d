//! Path evaluation.
//!
//! Walks one candidate path edge by edge, evaluating the condition on each
//! edge against the check context.

use tracing::{trace, warn};

use crate::condition::Context;
use crate::error::GrantResult;
use crate::paths::Path;

/// Evaluate a single candidate path.
///
/// The root is skipped; every following node is visited in order:
/// - a gated node whose condition yields `false` fails the path at once;
/// - a condition error aborts the walk and is returned;
/// - an ungated node grants the path at once unless `check_full_path` is
///   set, in which case it imposes no constraint and the walk continues.
///
/// A walk that reaches the end without failing grants the path.
pub async fn evaluate_path(path: &Path, ctx: &Context, check_full_path: bool) -> GrantResult<bool> {
    for node in path.nodes().iter().skip(1) {
        match &node.condition {
            Some(condition) => {
                let granted = condition.evaluate(ctx).await.map_err(|e| {
                    warn!(node = %node.value, error = %e, "Condition failed");
                    e
                })?;

                if !granted {
                    trace!(node = %node.value, "Condition not satisfied");
                    return Ok(false);
                }
            }
            None if !check_full_path => {
                trace!(node = %node.value, "Unconditioned edge grants path");
                return Ok(true);
            }
            None => {}
        }
    }

    Ok(true)
}
