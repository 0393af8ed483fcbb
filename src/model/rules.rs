use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Comparison operator of a single condition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "EQ")]
    Eq,
    #[serde(rename = "!EQ")]
    Neq,
    #[serde(rename = "CTN")]
    Contains,
    #[serde(rename = "GT")]
    Gt,
    #[serde(rename = "LT")]
    Lt,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Contains,
        Operator::Gt,
        Operator::Lt,
    ];

    /// Wire spelling used by the rule feed
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Neq => "!EQ",
            Operator::Contains => "CTN",
            Operator::Gt => "GT",
            Operator::Lt => "LT",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EQ" => Ok(Operator::Eq),
            "!EQ" | "NEQ" => Ok(Operator::Neq),
            "CTN" | "CONTAINS" => Ok(Operator::Contains),
            "GT" => Ok(Operator::Gt),
            "LT" => Ok(Operator::Lt),
            _ => Err(format!("Unknown operator: {}", s)),
        }
    }
}

/// Fixed operator tag of a root rule, always serialized as `"AND"`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootOperator {
    #[default]
    #[serde(rename = "AND")]
    And,
}

/// Fixed operator tag of an OR group, always serialized as `"OR"`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupOperator {
    #[default]
    #[serde(rename = "OR")]
    Or,
}

/// Leaf comparison: `field operator value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRule {
    /// Empty string means the field has not been chosen yet
    pub field: String,
    pub operator: Operator,
    pub value: String,
    pub enabled: bool,
}

impl ConditionRule {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            enabled: true,
        }
    }

    /// The blank condition placed into every freshly created group
    pub fn empty() -> Self {
        Self::new("", Operator::Eq, "")
    }
}

impl Default for ConditionRule {
    fn default() -> Self {
        Self::empty()
    }
}

/// Middle level: conditions combined with OR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrGroup {
    pub enabled: bool,
    #[serde(default)]
    pub operator: GroupOperator,
    pub children: Vec<ConditionRule>,
}

impl OrGroup {
    pub fn new(children: Vec<ConditionRule>) -> Self {
        Self {
            enabled: true,
            operator: GroupOperator::Or,
            children,
        }
    }

    /// An enabled group holding a single empty condition
    pub fn with_empty_condition() -> Self {
        Self::new(vec![ConditionRule::empty()])
    }

    pub fn add_condition(&mut self) {
        self.children.push(ConditionRule::empty());
    }

    /// Removes the condition at `index`, returning it when the index was in range
    pub fn remove_condition(&mut self, index: usize) -> Option<ConditionRule> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }
}

/// Top level of a rule type: OR groups combined with AND
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootRule {
    pub enabled: bool,
    #[serde(default)]
    pub operator: RootOperator,
    pub children: Vec<OrGroup>,
}

impl RootRule {
    pub fn new(children: Vec<OrGroup>) -> Self {
        Self {
            enabled: true,
            operator: RootOperator::And,
            children,
        }
    }

    pub fn add_or_group(&mut self) {
        self.children.push(OrGroup::with_empty_condition());
    }

    /// Removes the group at `index`, returning it when the index was in range
    pub fn remove_or_group(&mut self, index: usize) -> Option<OrGroup> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    /// Iterates every condition of every group, disabled ones included
    pub fn conditions(&self) -> impl Iterator<Item = &ConditionRule> {
        self.children.iter().flat_map(|group| group.children.iter())
    }
}

impl Default for RootRule {
    /// One enabled group with one empty condition
    fn default() -> Self {
        Self::new(vec![OrGroup::with_empty_condition()])
    }
}

/// Rule type name -> authored root rule. A missing key means nothing has been authored for
/// that type yet, which is different from a root with no groups.
pub type UserConfig = BTreeMap<String, RootRule>;

/// Address of a node inside one rule tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum NodePath {
    Root,
    Group { group: usize },
    Condition { group: usize, condition: usize },
}

/// A value edit applied to one condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "value", rename_all = "snake_case")]
pub enum ConditionEdit {
    Field(String),
    Operator(Operator),
    Value(String),
}
