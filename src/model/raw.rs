//! Boundary shapes for rule data coming from outside the editor.
//!
//! Feeds in the wild send `enabled` either as a boolean or as the strings `"true"`/`"false"`,
//! and sometimes leave fields out entirely. Everything here is converted once into the strict
//! types of [`crate::model::rules`]; nothing past this module sees the loose form.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::error::{Result, RuleSetError};
use crate::model::rules::{
    ConditionRule, GroupOperator, Operator, OrGroup, RootOperator, RootRule, UserConfig,
};

/// `enabled` as found on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyFlag {
    Bool(bool),
    Text(String),
}

impl LegacyFlag {
    /// Only the exact string `"true"` counts as enabled
    pub fn normalize(&self) -> bool {
        match self {
            LegacyFlag::Bool(flag) => *flag,
            LegacyFlag::Text(text) => text == "true",
        }
    }
}

fn flag_or_enabled(flag: &Option<LegacyFlag>) -> bool {
    flag.as_ref().map(LegacyFlag::normalize).unwrap_or(true)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConditionRule {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub enabled: Option<LegacyFlag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrGroup {
    #[serde(default)]
    pub enabled: Option<LegacyFlag>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub children: Vec<RawConditionRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRootRule {
    #[serde(default)]
    pub enabled: Option<LegacyFlag>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub children: Vec<RawOrGroup>,
}

/// A `null` entry means no rule authored for that type
pub type RawUserConfig = BTreeMap<String, Option<RawRootRule>>;

impl TryFrom<RawConditionRule> for ConditionRule {
    type Error = RuleSetError;

    fn try_from(raw: RawConditionRule) -> Result<Self> {
        let operator = match raw.operator.as_deref().map(str::trim) {
            None | Some("") => Operator::Eq,
            Some(text) => text.parse().map_err(RuleSetError::InvalidInput)?,
        };

        Ok(ConditionRule {
            field: raw.field.unwrap_or_default(),
            operator,
            value: raw.value.unwrap_or_default(),
            enabled: flag_or_enabled(&raw.enabled),
        })
    }
}

impl TryFrom<RawOrGroup> for OrGroup {
    type Error = RuleSetError;

    fn try_from(raw: RawOrGroup) -> Result<Self> {
        if let Some(op) = raw.operator.as_deref() {
            if !op.eq_ignore_ascii_case("OR") {
                warn!("Ignoring group operator '{}', groups are always OR", op);
            }
        }

        Ok(OrGroup {
            enabled: flag_or_enabled(&raw.enabled),
            operator: GroupOperator::Or,
            children: raw
                .children
                .into_iter()
                .map(ConditionRule::try_from)
                .collect::<Result<_>>()?,
        })
    }
}

impl TryFrom<RawRootRule> for RootRule {
    type Error = RuleSetError;

    fn try_from(raw: RawRootRule) -> Result<Self> {
        if let Some(op) = raw.operator.as_deref() {
            if !op.eq_ignore_ascii_case("AND") {
                warn!("Ignoring root operator '{}', roots are always AND", op);
            }
        }

        Ok(RootRule {
            enabled: flag_or_enabled(&raw.enabled),
            operator: RootOperator::And,
            children: raw
                .children
                .into_iter()
                .map(OrGroup::try_from)
                .collect::<Result<_>>()?,
        })
    }
}

/// Normalize a raw feed into a [`UserConfig`], dropping `null` entries
pub fn normalize_user_config(raw: RawUserConfig) -> Result<UserConfig> {
    let mut config = UserConfig::new();
    for (rule_type, root) in raw {
        if let Some(root) = root {
            let root = RootRule::try_from(root).map_err(|e| match e {
                RuleSetError::InvalidInput(message) => {
                    RuleSetError::InvalidInput(format!("{}: {}", rule_type, message))
                }
                other => other,
            })?;
            config.insert(rule_type, root);
        }
    }
    Ok(config)
}

/// Parse and normalize a JSON rule feed
pub fn parse_user_config(json: &str) -> Result<UserConfig> {
    let raw: RawUserConfig = serde_json::from_str(json)?;
    normalize_user_config(raw)
}

/// Normalize an already-decoded JSON value
pub fn user_config_from_value(value: serde_json::Value) -> Result<UserConfig> {
    let raw: RawUserConfig = serde_json::from_value(value)?;
    normalize_user_config(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_enabled_is_coerced() {
        let config = user_config_from_value(json!({
            "TYPE_A_RULE": {
                "enabled": "false",
                "operator": "AND",
                "children": [{
                    "enabled": "true",
                    "operator": "OR",
                    "children": [
                        { "field": "user", "operator": "!EQ", "value": "ddd", "enabled": "true" },
                        { "field": "user", "operator": "EQ", "value": "eee", "enabled": "yes" }
                    ]
                }]
            }
        }))
        .unwrap();

        let root = &config["TYPE_A_RULE"];
        assert!(!root.enabled);
        assert!(root.children[0].enabled);
        assert!(root.children[0].children[0].enabled);
        assert!(!root.children[0].children[1].enabled);
        assert_eq!(root.children[0].children[0].operator, Operator::Neq);
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let config = user_config_from_value(json!({
            "TYPE_A_RULE": { "children": [ { "children": [ { "operator": "" } ] } ] },
            "TYPE_B_RULE": null
        }))
        .unwrap();

        assert!(!config.contains_key("TYPE_B_RULE"));
        let condition = &config["TYPE_A_RULE"].children[0].children[0];
        assert_eq!(condition, &ConditionRule::empty());
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let err = parse_user_config(
            r#"{"TYPE_A_RULE": {"children": [{"children": [{"field": "x", "operator": "LIKE", "value": "y"}]}]}}"#,
        )
        .unwrap_err();
        match err {
            RuleSetError::InvalidInput(message) => assert!(message.starts_with("TYPE_A_RULE")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_normalized_output_has_boolean_flags() {
        let config = parse_user_config(
            r#"{"TYPE_A_RULE": {"enabled": true, "operator": "AND", "children": [
                {"enabled": true, "operator": "OR", "children": [
                    {"field": "status", "operator": "EQ", "value": "active", "enabled": "true"}
                ]}
            ]}}"#,
        )
        .unwrap();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value["TYPE_A_RULE"]["children"][0]["children"][0]["enabled"],
            json!(true)
        );
    }
}
