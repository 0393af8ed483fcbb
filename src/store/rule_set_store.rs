use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::logic::{DirtyTracker, RuleTree, RuleValidator, TypeChange, ValidationReport};
use crate::model::{
    ChangeAction, Commit, ConditionEdit, NodePath, Operator, Result, RootRule, RuleSetError,
    UserConfig,
};
use crate::store::traits::UserPrompt;

/// One row of the rule type list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub name: String,
    pub selected: bool,
    pub has_rules: bool,
    pub rule_count: usize,
    pub dirty: bool,
    pub has_error: bool,
}

/// Keyed collection of live rule trees plus the last committed snapshot.
///
/// Every UI action goes through here. Derived flags (dirty, validation) are recomputed on
/// each query, never stored.
pub struct RuleSetStore {
    known_types: Vec<String>,
    live: BTreeMap<String, RuleTree>,
    snapshot: UserConfig,
    selected: Option<String>,
    readonly: bool,
    /// Report bad indexes and unknown types as errors instead of ignoring them
    strict: bool,
    history: Vec<Commit>,
    prompt: Arc<dyn UserPrompt>,
}

impl RuleSetStore {
    pub fn new(prompt: Arc<dyn UserPrompt>) -> Self {
        Self {
            known_types: Vec::new(),
            live: BTreeMap::new(),
            snapshot: UserConfig::new(),
            selected: None,
            readonly: false,
            strict: false,
            history: Vec::new(),
            prompt,
        }
    }

    pub fn with_strict_bounds(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Replace everything with `initial_data`. Live trees are built only for known types;
    /// the snapshot keeps the whole input.
    pub fn initialize(&mut self, initial_data: UserConfig, known_types: Vec<String>) {
        for rule_type in initial_data.keys() {
            if !known_types.contains(rule_type) {
                warn!("Ignoring rule for unknown type '{}'", rule_type);
            }
        }

        self.known_types = known_types;
        self.live = Self::build_live(&self.known_types, &initial_data);
        self.snapshot = initial_data;
        self.selected = None;
        self.history.clear();

        info!(
            "Rule set initialized: {} known types, {} with rules",
            self.known_types.len(),
            self.live.len()
        );
    }

    fn build_live(known_types: &[String], data: &UserConfig) -> BTreeMap<String, RuleTree> {
        known_types
            .iter()
            .filter_map(|t| {
                data.get(t)
                    .map(|root| (t.clone(), RuleTree::create_root(Some(root))))
            })
            .collect()
    }

    // ---- selection and flags ----

    pub fn select_type(&mut self, rule_type: &str) -> Result<()> {
        if !self.is_known(rule_type) {
            return self.tolerate(RuleSetError::UnknownType(rule_type.to_string()));
        }
        self.selected = Some(rule_type.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Flip read-only mode, returning the new state. Has no effect on node flags or the snapshot.
    pub fn toggle_readonly(&mut self) -> bool {
        self.readonly = !self.readonly;
        info!("Read-only mode {}", if self.readonly { "on" } else { "off" });
        self.readonly
    }

    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    // ---- rule lifecycle ----

    /// Install the default tree for a type that has none
    pub fn create_new_rule(&mut self, rule_type: &str) -> Result<()> {
        self.ensure_writable()?;
        if !self.is_known(rule_type) {
            return self.tolerate(RuleSetError::UnknownType(rule_type.to_string()));
        }
        if self.live.contains_key(rule_type) {
            return Err(RuleSetError::AlreadyExists(rule_type.to_string()));
        }

        self.live
            .insert(rule_type.to_string(), RuleTree::create_root(None));
        info!("Created rule for {}", rule_type);
        Ok(())
    }

    /// Remove the whole tree of a type after confirmation. Returns whether it was removed.
    pub fn delete_rule(&mut self, rule_type: &str) -> Result<bool> {
        self.ensure_writable()?;
        if !self.live.contains_key(rule_type) {
            self.tolerate(RuleSetError::UnknownType(rule_type.to_string()))?;
            return Ok(false);
        }

        if !self.prompt.confirm(&format!("Delete {}?", rule_type)) {
            debug!("Delete of {} declined", rule_type);
            return Ok(false);
        }

        self.live.remove(rule_type);
        if self.selected.as_deref() == Some(rule_type) {
            self.selected = None;
        }
        info!("Deleted rule for {}", rule_type);
        Ok(true)
    }

    // ---- structural and value edits ----

    pub fn add_or_group(&mut self, rule_type: &str) -> Result<()> {
        self.mutate(rule_type, |tree| {
            tree.add_or_group();
            Ok(())
        })
    }

    pub fn remove_or_group(&mut self, rule_type: &str, group: usize) -> Result<()> {
        self.mutate(rule_type, |tree| tree.try_remove_or_group(group).map(|_| ()))
    }

    pub fn add_condition(&mut self, rule_type: &str, group: usize) -> Result<()> {
        self.mutate(rule_type, |tree| tree.add_condition(group))
    }

    pub fn remove_condition(&mut self, rule_type: &str, group: usize, condition: usize) -> Result<()> {
        self.mutate(rule_type, |tree| {
            tree.try_remove_condition(group, condition).map(|_| ())
        })
    }

    pub fn toggle_enabled(&mut self, rule_type: &str, path: NodePath) -> Result<()> {
        self.mutate(rule_type, |tree| tree.toggle_enabled(path).map(|_| ()))
    }

    pub fn set_enabled(&mut self, rule_type: &str, path: NodePath, enabled: bool) -> Result<()> {
        self.mutate(rule_type, |tree| tree.set_enabled(path, enabled))
    }

    pub fn edit_condition(
        &mut self,
        rule_type: &str,
        group: usize,
        condition: usize,
        edit: ConditionEdit,
    ) -> Result<()> {
        self.mutate(rule_type, |tree| tree.edit_condition(group, condition, edit))
    }

    pub fn set_field(&mut self, rule_type: &str, group: usize, condition: usize, field: &str) -> Result<()> {
        self.edit_condition(rule_type, group, condition, ConditionEdit::Field(field.to_string()))
    }

    pub fn set_operator(
        &mut self,
        rule_type: &str,
        group: usize,
        condition: usize,
        operator: Operator,
    ) -> Result<()> {
        self.edit_condition(rule_type, group, condition, ConditionEdit::Operator(operator))
    }

    pub fn set_value(&mut self, rule_type: &str, group: usize, condition: usize, value: &str) -> Result<()> {
        self.edit_condition(rule_type, group, condition, ConditionEdit::Value(value.to_string()))
    }

    fn mutate<F>(&mut self, rule_type: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut RuleTree) -> Result<()>,
    {
        self.ensure_writable()?;
        let result = match self.live.get_mut(rule_type) {
            Some(tree) => edit(tree),
            None => Err(RuleSetError::UnknownType(rule_type.to_string())),
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) => self.tolerate(e),
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.readonly {
            Err(RuleSetError::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Addressing errors are dropped unless strict; everything else passes through
    fn tolerate(&self, err: RuleSetError) -> Result<()> {
        match err {
            RuleSetError::OutOfBounds { .. } | RuleSetError::UnknownType(_) if !self.strict => {
                debug!("Ignoring: {}", err);
                Ok(())
            }
            err => Err(err),
        }
    }

    // ---- save / reset ----

    /// Commit every live tree as the new snapshot. Refused when nothing changed, and refused
    /// as a whole when any known type has an invalid condition.
    pub fn save_all(&mut self) -> Result<Commit> {
        if !self.is_form_dirty() {
            let err = RuleSetError::NothingToChange(ChangeAction::Save);
            self.prompt.notify(&err.to_string());
            return Err(err);
        }

        let invalid = self.invalid_types();
        if !invalid.is_empty() {
            let err = RuleSetError::ValidationBlocked { types: invalid };
            warn!("Save blocked: {}", err);
            self.prompt.notify(&err.to_string());
            return Err(err);
        }

        let committed = self.raw_value();
        let parent_hash = self.history.last().map(|c| c.hash.clone());
        let commit = Commit::new(parent_hash, &committed)?;
        info!(
            "Saving all rules ({}): {}",
            commit.hash,
            Commit::canonical_json(&committed)?
        );

        self.snapshot = committed;
        self.history.push(commit.clone());
        self.prompt.notify("All rules saved");
        Ok(commit)
    }

    /// Rebuild every live tree from the snapshot after confirmation, dropping all edits.
    /// Returns whether the reset happened.
    pub fn reset_all(&mut self) -> Result<bool> {
        if !self.is_form_dirty() {
            let err = RuleSetError::NothingToChange(ChangeAction::Reset);
            self.prompt.notify(&err.to_string());
            return Err(err);
        }

        if !self.prompt.confirm("Reset all changes?") {
            debug!("Reset declined");
            return Ok(false);
        }

        self.live = Self::build_live(&self.known_types, &self.snapshot);
        if let Some(selected) = &self.selected {
            if !self.is_known(selected) {
                self.selected = None;
            }
        }

        info!("Reset all rules to last save");
        self.prompt.notify("All changes have been reset");
        Ok(true)
    }

    // ---- read model ----

    pub fn known_types(&self) -> &[String] {
        &self.known_types
    }

    pub fn is_known(&self, rule_type: &str) -> bool {
        self.known_types.iter().any(|t| t == rule_type)
    }

    pub fn selected_type(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn has_rules(&self, rule_type: &str) -> bool {
        self.live.contains_key(rule_type)
    }

    /// Number of OR groups, 0 when the type has no rule
    pub fn get_rule_count(&self, rule_type: &str) -> usize {
        self.live.get(rule_type).map(RuleTree::rule_count).unwrap_or(0)
    }

    pub fn tree(&self, rule_type: &str) -> Option<&RuleTree> {
        self.live.get(rule_type)
    }

    pub fn rule(&self, rule_type: &str) -> Option<&RootRule> {
        self.live.get(rule_type).map(RuleTree::root)
    }

    fn tracker(&self) -> DirtyTracker<'_> {
        DirtyTracker::new(&self.snapshot, &self.live)
    }

    pub fn change_for(&self, rule_type: &str) -> TypeChange {
        self.tracker().change_for(rule_type)
    }

    pub fn is_dirty(&self, rule_type: &str) -> bool {
        self.tracker().is_dirty(rule_type)
    }

    pub fn is_form_dirty(&self) -> bool {
        self.tracker().is_form_dirty(self.known_types.as_slice())
    }

    pub fn dirty_types(&self) -> Vec<(String, TypeChange)> {
        self.tracker().dirty_types(self.known_types.as_slice())
    }

    pub fn has_validation_error(&self, rule_type: &str) -> bool {
        RuleValidator::has_validation_error(self.rule(rule_type))
    }

    pub fn validation_report(&self, rule_type: &str) -> Option<ValidationReport> {
        self.rule(rule_type)
            .map(|root| RuleValidator::validate_rule(rule_type, root))
    }

    /// Known types with at least one invalid condition, in known-type order
    pub fn invalid_types(&self) -> Vec<String> {
        self.known_types
            .iter()
            .filter(|t| self.has_validation_error(t))
            .cloned()
            .collect()
    }

    pub fn type_summaries(&self) -> Vec<TypeSummary> {
        self.known_types
            .iter()
            .map(|t| TypeSummary {
                name: t.clone(),
                selected: self.selected.as_deref() == Some(t.as_str()),
                has_rules: self.has_rules(t),
                rule_count: self.get_rule_count(t),
                dirty: self.is_dirty(t),
                has_error: self.has_validation_error(t),
            })
            .collect()
    }

    /// Current value of every known type with a rule: what a save would commit
    pub fn raw_value(&self) -> UserConfig {
        self.known_types
            .iter()
            .filter_map(|t| self.live.get(t).map(|tree| (t.clone(), tree.raw_value())))
            .collect()
    }

    pub fn snapshot(&self) -> &UserConfig {
        &self.snapshot
    }

    pub fn history(&self) -> &[Commit] {
        &self.history
    }

    pub fn last_commit(&self) -> Option<&Commit> {
        self.history.last()
    }
}
