use serde_json::json;
use std::time::Duration;

use crate::model::{user_config_from_value, CaseType, Result, Section, UserConfig};
use crate::store::{FieldSource, RuleSetStore};

/// Rule types offered by default, in display order
pub fn default_known_types() -> Vec<String> {
    ["TYPE_A_RULE", "TYPE_B_RULE", "TYPE_C_RULE", "TYPE_D_RULE", "TYPE_E_RULE"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

/// Demonstration rules for TYPE_A_RULE and TYPE_B_RULE, in the feed's wire shape
pub fn sample_user_config() -> Result<UserConfig> {
    user_config_from_value(json!({
        "TYPE_A_RULE": {
            "enabled": true,
            "operator": "AND",
            "children": [
                {
                    "enabled": true,
                    "operator": "OR",
                    "children": [
                        { "field": "assigen", "operator": "EQ", "value": "xxx", "enabled": true },
                        { "field": "comment", "operator": "CTN", "value": "xxx", "enabled": true },
                        { "field": "user", "operator": "!EQ", "value": "ddd", "enabled": true }
                    ]
                },
                {
                    "enabled": true,
                    "operator": "OR",
                    "children": [
                        { "field": "assigen", "operator": "EQ", "value": "yyy", "enabled": true },
                        { "field": "comment", "operator": "CTN", "value": "yyy", "enabled": "true" }
                    ]
                }
            ]
        },
        "TYPE_B_RULE": {
            "enabled": true,
            "operator": "AND",
            "children": [
                {
                    "enabled": true,
                    "operator": "OR",
                    "children": [
                        { "field": "status", "operator": "EQ", "value": "active", "enabled": true }
                    ]
                }
            ]
        }
    }))
}

/// Initialize `store` with the sample rules and `known_types`
pub fn load_seed_data(store: &mut RuleSetStore, known_types: Vec<String>) -> Result<()> {
    let data = sample_user_config()?;
    store.initialize(data, known_types);
    Ok(())
}

/// Field source answering `<Section>_<Case>_1` and `_2` after a fixed delay
#[derive(Debug, Clone)]
pub struct SampleFieldSource {
    latency: Duration,
}

impl SampleFieldSource {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SampleFieldSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

#[async_trait::async_trait]
impl FieldSource for SampleFieldSource {
    async fn fetch_fields(&self, section: Section, case_type: CaseType) -> anyhow::Result<Vec<String>> {
        tokio::time::sleep(self.latency).await;
        Ok(vec![
            format!("{}_{}_1", section, case_type),
            format!("{}_{}_2", section, case_type),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::RuleValidator;

    #[test]
    fn test_sample_config_is_valid_and_normalized() {
        let config = sample_user_config().unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config["TYPE_A_RULE"].children.len(), 2);
        assert!(config["TYPE_A_RULE"].children[1].children[1].enabled);
        for root in config.values() {
            assert!(!RuleValidator::has_validation_error(Some(root)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_field_source() {
        let fields = SampleFieldSource::default()
            .fetch_fields(Section::Section2, CaseType::A)
            .await
            .unwrap();
        assert_eq!(fields, vec!["Section2_A_1", "Section2_A_2"]);
    }
}
