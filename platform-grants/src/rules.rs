//! # Rules
//!
//! Grant rules and the adjacency index built over them.
//!
//! Roles and permissions share one flat identifier namespace: a rule
//! `a -> b` says "whoever holds `a` also holds `b`", whether `b` names a
//! role or a permission. Nothing in the engine tells the two apart.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::condition::Condition;

/// A directed grant edge, optionally gated by a condition.
///
/// # Example
///
/// ```
/// use platform_grants::condition::{self, Context};
/// use platform_grants::rules::Rule;
///
/// let plain = Rule::new("admin", "user");
/// assert!(!plain.is_conditional());
///
/// let gated = Rule::new("user", "article editor")
///     .when(condition::predicate(|ctx: &Context| ctx.get_i64("userId") == Some(2)));
/// assert!(gated.is_conditional());
/// ```
#[derive(Clone)]
pub struct Rule {
    /// Identifier granting.
    pub from: String,
    /// Identifier granted.
    pub to: String,
    /// Optional gate evaluated against the check context.
    pub condition: Option<Arc<dyn Condition>>,
}

impl Rule {
    /// Create an unconditioned grant.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            condition: None,
        }
    }

    /// Gate this grant with a condition.
    pub fn when(mut self, condition: impl Condition + 'static) -> Self {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Gate this grant with an already shared condition.
    pub fn when_shared(mut self, condition: Arc<dyn Condition>) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Check if this grant carries a condition.
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("conditional", &self.is_conditional())
            .finish()
    }
}

/// Serialized, condition-free form of a rule.
///
/// Uses the `{"a": ..., "can": ...}` shape so plain grant lists can be kept
/// in JSON. Conditions are code and can only be attached with [`Rule::when`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    /// Identifier granting.
    #[serde(rename = "a")]
    pub from: String,
    /// Identifier granted.
    #[serde(rename = "can")]
    pub to: String,
}

impl RuleDef {
    /// Parse a JSON array of rule definitions.
    ///
    /// ```
    /// use platform_grants::rules::RuleDef;
    ///
    /// let defs = RuleDef::parse_list(r#"[{"a": "admin", "can": "user"}]"#).unwrap();
    /// assert_eq!(defs[0].from, "admin");
    /// assert_eq!(defs[0].to, "user");
    /// ```
    pub fn parse_list(json: &str) -> Result<Vec<RuleDef>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<RuleDef> for Rule {
    fn from(def: RuleDef) -> Self {
        Rule::new(def.from, def.to)
    }
}

/// Rules indexed by their source identifier.
///
/// Built once; child lookup during tree expansion is a map hit instead of a
/// scan of the full rule list. Declaration order is kept per source.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    rules: Vec<Rule>,
    by_source: HashMap<String, Vec<usize>>,
}

impl RuleIndex {
    /// Index a rule list.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let mut by_source: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            by_source.entry(rule.from.clone()).or_default().push(idx);
        }
        Self { rules, by_source }
    }

    /// Rules whose source is `id`, in declaration order.
    pub fn grants_from<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.by_source
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.rules[idx])
    }

    /// All rules, in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<Rule> for RuleIndex {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::from_rules(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{predicate, Context};

    #[test]
    fn test_grants_from_keeps_declaration_order() {
        let index = RuleIndex::from_rules(vec![
            Rule::new("user", "vote on articles"),
            Rule::new("admin", "user"),
            Rule::new("user", "visitor"),
            Rule::new("user", "read articles"),
        ]);

        let targets: Vec<&str> = index.grants_from("user").map(|r| r.to.as_str()).collect();
        assert_eq!(targets, vec!["vote on articles", "visitor", "read articles"]);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_grants_from_unknown() {
        let index = RuleIndex::from_rules(vec![Rule::new("admin", "user")]);
        assert_eq!(index.grants_from("nobody").count(), 0);
        assert!(RuleIndex::default().is_empty());
    }

    #[test]
    fn test_rule_def_parsing() {
        let defs = RuleDef::parse_list(
            r#"[{"a": "visitor", "can": "read articles"}, {"a": "user", "can": "visitor"}]"#,
        )
        .unwrap();
        let index: RuleIndex = defs.into_iter().map(Rule::from).collect();
        assert_eq!(index.grants_from("user").next().unwrap().to, "visitor");
    }

    #[test]
    fn test_rule_def_rejects_missing_keys() {
        assert!(RuleDef::parse_list(r#"[{"a": "visitor"}]"#).is_err());
    }

    #[test]
    fn test_shared_condition_and_rule_listing() {
        let gate: Arc<dyn Condition> =
            Arc::new(predicate(|ctx: &Context| ctx.get_i64("userId") == Some(2)));
        let index = RuleIndex::from_rules(vec![
            Rule::new("user", "article editor").when_shared(Arc::clone(&gate)),
            Rule::new("admin", "article editor").when_shared(Arc::clone(&gate)),
            Rule::new("admin", "user"),
        ]);

        let listed: Vec<(&str, bool)> = index
            .rules()
            .iter()
            .map(|r| (r.from.as_str(), r.is_conditional()))
            .collect();
        assert_eq!(listed, vec![("user", true), ("admin", true), ("admin", false)]);

        let first = index.rules()[0].condition.as_ref().unwrap();
        assert!(Arc::ptr_eq(first, &gate));
        assert_eq!(Arc::strong_count(&gate), 3);
    }

    #[test]
    fn test_rule_debug_hides_condition() {
        let rule = Rule::new("user", "delete article").when(predicate(|_: &Context| true));
        let debug = format!("{:?}", rule);
        assert!(debug.contains("conditional: true"));
    }
}
