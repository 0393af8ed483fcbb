use crate::model::{ConditionEdit, ConditionRule, NodePath, OrGroup, Result, RootRule, RuleSetError};

/// Live, editable rule tree of one rule type.
///
/// Structural edits happen in place. Enabled flags are independent per node: toggling a
/// root or group never touches its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTree {
    root: RootRule,
}

impl RuleTree {
    /// Build a tree from `initial`, or the default one-group/one-condition tree.
    /// `initial` is already normalized, so this is a plain deep copy.
    pub fn create_root(initial: Option<&RootRule>) -> Self {
        Self {
            root: initial.cloned().unwrap_or_default(),
        }
    }

    pub fn root(&self) -> &RootRule {
        &self.root
    }

    /// Full value of the tree, disabled nodes included
    pub fn raw_value(&self) -> RootRule {
        self.root.clone()
    }

    /// Number of OR groups
    pub fn rule_count(&self) -> usize {
        self.root.children.len()
    }

    pub fn group(&self, index: usize) -> Option<&OrGroup> {
        self.root.children.get(index)
    }

    pub fn condition(&self, group: usize, condition: usize) -> Option<&ConditionRule> {
        self.group(group)?.children.get(condition)
    }

    pub fn add_or_group(&mut self) {
        self.root.add_or_group();
    }

    /// Silently ignores an out-of-range index
    pub fn remove_or_group(&mut self, index: usize) {
        let _ = self.try_remove_or_group(index);
    }

    pub fn try_remove_or_group(&mut self, index: usize) -> Result<OrGroup> {
        let len = self.root.children.len();
        self.root
            .remove_or_group(index)
            .ok_or(RuleSetError::OutOfBounds {
                target: "group",
                index,
                len,
            })
    }

    pub fn add_condition(&mut self, group: usize) -> Result<()> {
        self.group_mut(group)?.add_condition();
        Ok(())
    }

    /// Silently ignores an out-of-range group or condition index
    pub fn remove_condition(&mut self, group: usize, condition: usize) {
        let _ = self.try_remove_condition(group, condition);
    }

    pub fn try_remove_condition(&mut self, group: usize, condition: usize) -> Result<ConditionRule> {
        let group = self.group_mut(group)?;
        let len = group.children.len();
        group
            .remove_condition(condition)
            .ok_or(RuleSetError::OutOfBounds {
                target: "condition",
                index: condition,
                len,
            })
    }

    /// Flip the addressed node's own flag, returning the new value
    pub fn toggle_enabled(&mut self, path: NodePath) -> Result<bool> {
        let flag = self.enabled_mut(path)?;
        *flag = !*flag;
        Ok(*flag)
    }

    pub fn set_enabled(&mut self, path: NodePath, enabled: bool) -> Result<()> {
        *self.enabled_mut(path)? = enabled;
        Ok(())
    }

    pub fn edit_condition(&mut self, group: usize, condition: usize, edit: ConditionEdit) -> Result<()> {
        let target = self.condition_mut(group, condition)?;
        match edit {
            ConditionEdit::Field(field) => target.field = field,
            ConditionEdit::Operator(operator) => target.operator = operator,
            ConditionEdit::Value(value) => target.value = value,
        }
        Ok(())
    }

    fn group_mut(&mut self, index: usize) -> Result<&mut OrGroup> {
        let len = self.root.children.len();
        self.root
            .children
            .get_mut(index)
            .ok_or(RuleSetError::OutOfBounds {
                target: "group",
                index,
                len,
            })
    }

    fn condition_mut(&mut self, group: usize, condition: usize) -> Result<&mut ConditionRule> {
        let group = self.group_mut(group)?;
        let len = group.children.len();
        group
            .children
            .get_mut(condition)
            .ok_or(RuleSetError::OutOfBounds {
                target: "condition",
                index: condition,
                len,
            })
    }

    fn enabled_mut(&mut self, path: NodePath) -> Result<&mut bool> {
        match path {
            NodePath::Root => Ok(&mut self.root.enabled),
            NodePath::Group { group } => Ok(&mut self.group_mut(group)?.enabled),
            NodePath::Condition { group, condition } => {
                Ok(&mut self.condition_mut(group, condition)?.enabled)
            }
        }
    }
}

impl From<RootRule> for RuleTree {
    fn from(root: RootRule) -> Self {
        Self { root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operator;

    fn sample_tree() -> RuleTree {
        RuleTree::from(RootRule::new(vec![
            OrGroup::new(vec![
                ConditionRule::new("assigen", Operator::Eq, "xxx"),
                ConditionRule::new("comment", Operator::Contains, "xxx"),
            ]),
            OrGroup::new(vec![ConditionRule::new("user", Operator::Neq, "ddd")]),
        ]))
    }

    #[test]
    fn test_create_root_without_initial_data() {
        let tree = RuleTree::create_root(None);
        assert!(tree.root().enabled);
        assert_eq!(tree.rule_count(), 1);
        assert_eq!(tree.condition(0, 0), Some(&ConditionRule::empty()));
    }

    #[test]
    fn test_create_root_copies_initial_data() {
        let source = sample_tree().raw_value();
        let mut tree = RuleTree::create_root(Some(&source));
        assert_eq!(tree.root(), &source);

        tree.add_or_group();
        assert_eq!(source.children.len(), 2);
        assert_eq!(tree.rule_count(), 3);
    }

    #[test]
    fn test_remove_group_preserves_order() {
        let mut tree = sample_tree();
        tree.add_or_group();
        tree.remove_or_group(0);
        assert_eq!(tree.rule_count(), 2);
        assert_eq!(tree.condition(0, 0).unwrap().field, "user");
        assert_eq!(tree.condition(1, 0), Some(&ConditionRule::empty()));
    }

    #[test]
    fn test_out_of_range_removals() {
        let mut tree = sample_tree();
        let before = tree.clone();

        tree.remove_or_group(7);
        tree.remove_condition(0, 9);
        tree.remove_condition(5, 0);
        assert_eq!(tree, before);

        assert_eq!(
            tree.try_remove_or_group(2),
            Err(RuleSetError::OutOfBounds {
                target: "group",
                index: 2,
                len: 2
            })
        );
        assert_eq!(
            tree.try_remove_condition(1, 1),
            Err(RuleSetError::OutOfBounds {
                target: "condition",
                index: 1,
                len: 1
            })
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn test_toggle_does_not_cascade() {
        let mut tree = sample_tree();
        assert_eq!(tree.toggle_enabled(NodePath::Root), Ok(false));
        assert!(tree.group(0).unwrap().enabled);
        assert!(tree.condition(0, 0).unwrap().enabled);

        assert_eq!(tree.toggle_enabled(NodePath::Group { group: 1 }), Ok(false));
        assert!(tree.condition(1, 0).unwrap().enabled);

        assert_eq!(
            tree.toggle_enabled(NodePath::Condition { group: 0, condition: 1 }),
            Ok(false)
        );
        assert!(tree.condition(0, 0).unwrap().enabled);
        assert!(!tree.condition(0, 1).unwrap().enabled);
    }

    #[test]
    fn test_edit_condition() {
        let mut tree = sample_tree();
        tree.add_condition(1).unwrap();
        tree.edit_condition(1, 1, ConditionEdit::Field("priority".into())).unwrap();
        tree.edit_condition(1, 1, ConditionEdit::Operator(Operator::Gt)).unwrap();
        tree.edit_condition(1, 1, ConditionEdit::Value("3".into())).unwrap();

        assert_eq!(
            tree.condition(1, 1),
            Some(&ConditionRule::new("priority", Operator::Gt, "3"))
        );
        assert!(tree.edit_condition(4, 0, ConditionEdit::Value("x".into())).is_err());
        assert!(tree.add_condition(4).is_err());
    }
}
