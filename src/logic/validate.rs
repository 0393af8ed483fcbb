use serde::{Deserialize, Serialize};

use crate::model::{ConditionRule, RootRule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub rule_type: String,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub condition_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub group_index: usize,
    pub condition_index: usize,
    pub error_type: ValidationErrorType,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorType {
    MissingField,
    MissingValue,
}

/// Required-field checks on conditions. Pure; nothing is cached between calls.
pub struct RuleValidator;

impl RuleValidator {
    /// `field` and `value` must be non-empty. The operator is a closed enum and always set;
    /// `enabled` carries no constraint.
    pub fn is_condition_valid(condition: &ConditionRule) -> bool {
        Self::condition_errors(condition).is_empty()
    }

    /// True when some condition of `root` is invalid, disabled groups and conditions included.
    /// No root means nothing authored, which is not an error.
    pub fn has_validation_error(root: Option<&RootRule>) -> bool {
        root.map(|root| root.conditions().any(|c| !Self::is_condition_valid(c)))
            .unwrap_or(false)
    }

    /// Every failing check of `root`, addressed by group and condition index
    pub fn validate_rule(rule_type: &str, root: &RootRule) -> ValidationReport {
        let mut report = ValidationReport {
            rule_type: rule_type.to_string(),
            valid: true,
            errors: Vec::new(),
            condition_count: 0,
        };

        for (group_index, group) in root.children.iter().enumerate() {
            for (condition_index, condition) in group.children.iter().enumerate() {
                report.condition_count += 1;
                for error_type in Self::condition_errors(condition) {
                    report.valid = false;
                    report.errors.push(ValidationError {
                        group_index,
                        condition_index,
                        error_type,
                        message: Self::message_for(error_type, group_index, condition_index),
                    });
                }
            }
        }

        report
    }

    fn condition_errors(condition: &ConditionRule) -> Vec<ValidationErrorType> {
        let mut errors = Vec::new();
        if condition.field.is_empty() {
            errors.push(ValidationErrorType::MissingField);
        }
        if condition.value.is_empty() {
            errors.push(ValidationErrorType::MissingValue);
        }
        errors
    }

    fn message_for(error_type: ValidationErrorType, group: usize, condition: usize) -> String {
        let what = match error_type {
            ValidationErrorType::MissingField => "field",
            ValidationErrorType::MissingValue => "value",
        };
        format!(
            "Group #{} condition #{}: {} is required",
            group + 1,
            condition + 1,
            what
        )
    }
}
