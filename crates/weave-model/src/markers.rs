//! Decoded marker metadata attached to a scanned item.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::tier::PriorityTier;

/// Access requirements decoded from condition markers, grouped by access
/// verb. A `view-admin.cond` marker lands here as `view -> {admin}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConditionContext {
    by_verb: BTreeMap<String, BTreeSet<String>>,
}

impl ConditionContext {
    pub fn insert(&mut self, verb: &str, role: &str) {
        self.by_verb
            .entry(verb.to_string())
            .or_default()
            .insert(role.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.by_verb.is_empty()
    }

    /// Verbs with their sorted role lists, in verb order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.by_verb.iter().map(|(verb, roles)| (verb.as_str(), roles))
    }

    pub fn roles_for(&self, verb: &str) -> Option<&BTreeSet<String>> {
        self.by_verb.get(verb)
    }
}

/// Everything decoded from one item folder's marker files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    /// Declared priority, if a `.priority` marker was present.
    pub tier: Option<PriorityTier>,
    /// Access requirements from `.cond` markers.
    pub conditions: ConditionContext,
    /// Feature toggles from `.enable` / `.disable` markers.
    pub features: BTreeMap<String, bool>,
    /// Alias target from a `.ref` marker.
    pub reference: Option<String>,
    /// Stable identity token from a `.myuid` marker or `_` placeholder.
    pub identity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_context_groups_roles_by_verb() {
        let mut ctx = ConditionContext::default();
        ctx.insert("view", "member");
        ctx.insert("view", "admin");
        ctx.insert("manage", "admin");
        let collected: Vec<(&str, Vec<&str>)> = ctx
            .iter()
            .map(|(verb, roles)| (verb, roles.iter().map(String::as_str).collect()))
            .collect();
        assert_eq!(
            collected,
            vec![("manage", vec!["admin"]), ("view", vec!["admin", "member"])]
        );
    }

    #[test]
    fn duplicate_roles_collapse() {
        let mut ctx = ConditionContext::default();
        ctx.insert("view", "admin");
        ctx.insert("view", "admin");
        assert_eq!(ctx.roles_for("view").map(BTreeSet::len), Some(1));
    }
}
