//! # Grant trees
//!
//! Expands the flat rule list into the tree of everything reachable from
//! one starting identifier.

use std::fmt;
use std::sync::Arc;

use crate::condition::Condition;
use crate::error::{GrantError, GrantResult};
use crate::rules::RuleIndex;

/// A node in an expanded grant tree.
///
/// Every non-root node stands for exactly one rule whose source is the
/// parent's value; it carries that rule's condition.
#[derive(Clone)]
pub struct Node {
    /// Identifier at this node.
    pub value: String,
    /// Condition on the edge leading into this node. Always `None` at the root.
    pub condition: Option<Arc<dyn Condition>>,
    /// Child nodes, in rule declaration order.
    pub children: Vec<Arc<Node>>,
}

impl Node {
    /// Create a childless root node.
    pub fn root(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            condition: None,
            children: Vec::new(),
        }
    }

    /// Check if the edge into this node is gated.
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    /// Count the nodes in this subtree, including this one.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|c| c.size()).sum::<usize>()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("conditional", &self.is_conditional())
            .field("children", &self.children)
            .finish()
    }
}

/// Build the grant tree rooted at `role`.
///
/// Children are expanded recursively for every rule whose source matches a
/// node's value. The same identifier may appear on several branches (a
/// diamond); each occurrence is expanded on its own.
///
/// # Errors
///
/// Returns [`GrantError::CyclicRuleGraph`] if an identifier is reachable
/// from itself.
pub fn build_tree(role: &str, rules: &RuleIndex) -> GrantResult<Arc<Node>> {
    let mut ancestors = vec![role.to_string()];
    let children = expand(role, rules, &mut ancestors)?;

    Ok(Arc::new(Node {
        value: role.to_string(),
        condition: None,
        children,
    }))
}

fn expand(id: &str, rules: &RuleIndex, ancestors: &mut Vec<String>) -> GrantResult<Vec<Arc<Node>>> {
    let mut children = Vec::new();

    for rule in rules.grants_from(id) {
        if let Some(start) = ancestors.iter().position(|a| *a == rule.to) {
            let mut cycle = ancestors[start..].to_vec();
            cycle.push(rule.to.clone());
            return Err(GrantError::CyclicRuleGraph { cycle });
        }

        ancestors.push(rule.to.clone());
        let grandchildren = expand(&rule.to, rules, ancestors)?;
        ancestors.pop();

        children.push(Arc::new(Node {
            value: rule.to.clone(),
            condition: rule.condition.clone(),
            children: grandchildren,
        }));
    }

    Ok(children)
}
