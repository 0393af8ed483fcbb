use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::logic::tree::RuleTree;
use crate::model::UserConfig;

/// How the live rule of a type differs from the committed one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeChange {
    Unchanged,
    /// Live rule with nothing committed
    Added,
    /// Committed rule that was deleted
    Removed,
    /// Both exist and are structurally different
    Modified,
}

impl TypeChange {
    pub fn is_dirty(&self) -> bool {
        !matches!(self, TypeChange::Unchanged)
    }
}

/// Compares live trees against the last committed snapshot.
///
/// Comparison is structural equality on the normalized model (order-sensitive on children,
/// key-by-key on the maps), never string comparison of serialized output.
pub struct DirtyTracker<'a> {
    snapshot: &'a UserConfig,
    live: &'a BTreeMap<String, RuleTree>,
}

impl<'a> DirtyTracker<'a> {
    pub fn new(snapshot: &'a UserConfig, live: &'a BTreeMap<String, RuleTree>) -> Self {
        Self { snapshot, live }
    }

    pub fn change_for(&self, rule_type: &str) -> TypeChange {
        match (self.snapshot.get(rule_type), self.live.get(rule_type)) {
            (None, None) => TypeChange::Unchanged,
            (None, Some(_)) => TypeChange::Added,
            (Some(_), None) => TypeChange::Removed,
            (Some(saved), Some(tree)) => {
                // raw value includes disabled nodes
                if saved == tree.root() {
                    TypeChange::Unchanged
                } else {
                    TypeChange::Modified
                }
            }
        }
    }

    pub fn is_dirty(&self, rule_type: &str) -> bool {
        self.change_for(rule_type).is_dirty()
    }

    /// True when any of `rule_types` is dirty
    pub fn is_form_dirty<S: AsRef<str>>(&self, rule_types: &[S]) -> bool {
        rule_types.iter().any(|t| self.is_dirty(t.as_ref()))
    }

    /// Dirty types among `rule_types`, in the given order
    pub fn dirty_types<S: AsRef<str>>(&self, rule_types: &[S]) -> Vec<(String, TypeChange)> {
        rule_types
            .iter()
            .map(|t| (t.as_ref().to_string(), self.change_for(t.as_ref())))
            .filter(|(_, change)| change.is_dirty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConditionEdit, ConditionRule, NodePath, Operator, OrGroup, RootRule};

    fn committed() -> UserConfig {
        let mut config = UserConfig::new();
        config.insert(
            "TYPE_A_RULE".to_string(),
            RootRule::new(vec![OrGroup::new(vec![ConditionRule::new(
                "status",
                Operator::Eq,
                "active",
            )])]),
        );
        config
    }

    fn live_from(config: &UserConfig) -> BTreeMap<String, RuleTree> {
        config
            .iter()
            .map(|(t, root)| (t.clone(), RuleTree::create_root(Some(root))))
            .collect()
    }

    #[test]
    fn test_truth_table() {
        let snapshot = committed();
        let mut live = live_from(&snapshot);
        live.insert("TYPE_B_RULE".to_string(), RuleTree::create_root(None));

        let tracker = DirtyTracker::new(&snapshot, &live);
        assert_eq!(tracker.change_for("TYPE_A_RULE"), TypeChange::Unchanged);
        assert_eq!(tracker.change_for("TYPE_B_RULE"), TypeChange::Added);
        assert_eq!(tracker.change_for("TYPE_C_RULE"), TypeChange::Unchanged);

        let empty = BTreeMap::new();
        let tracker = DirtyTracker::new(&snapshot, &empty);
        assert_eq!(tracker.change_for("TYPE_A_RULE"), TypeChange::Removed);
    }

    #[test]
    fn test_disabled_edits_still_count() {
        let snapshot = committed();
        let mut live = live_from(&snapshot);
        let tree = live.get_mut("TYPE_A_RULE").unwrap();
        tree.toggle_enabled(NodePath::Condition { group: 0, condition: 0 })
            .unwrap();

        let tracker = DirtyTracker::new(&snapshot, &live);
        assert_eq!(tracker.change_for("TYPE_A_RULE"), TypeChange::Modified);
    }

    #[test]
    fn test_reverting_an_edit_is_clean_again() {
        let snapshot = committed();
        let mut live = live_from(&snapshot);
        let tree = live.get_mut("TYPE_A_RULE").unwrap();
        tree.edit_condition(0, 0, ConditionEdit::Value("closed".into()))
            .unwrap();
        tree.edit_condition(0, 0, ConditionEdit::Value("active".into()))
            .unwrap();

        let tracker = DirtyTracker::new(&snapshot, &live);
        assert!(!tracker.is_dirty("TYPE_A_RULE"));
    }

    #[test]
    fn test_form_dirty_over_known_types() {
        let snapshot = committed();
        let mut live = live_from(&snapshot);
        live.get_mut("TYPE_A_RULE").unwrap().add_or_group();

        let tracker = DirtyTracker::new(&snapshot, &live);
        assert!(tracker.is_form_dirty(&["TYPE_A_RULE", "TYPE_B_RULE"]));
        assert!(!tracker.is_form_dirty(&["TYPE_B_RULE"]));
        assert_eq!(
            tracker.dirty_types(&["TYPE_B_RULE", "TYPE_A_RULE"]),
            vec![("TYPE_A_RULE".to_string(), TypeChange::Modified)]
        );
    }
}
