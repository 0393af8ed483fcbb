pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export logic types
pub use logic::{
    DirtyTracker, RuleTree, RuleValidator, TypeChange, ValidationError, ValidationErrorType,
    ValidationReport,
};

// Export all model types
pub use model::*;

// Export seed module
pub use seed::*;

// Export store types
pub use store::{
    Confirmation, ConsolePrompt, FieldCache, FieldLookup, FieldSource, Notification,
    RuleSetStore, ScriptedPrompt, TypeSummary, UserPrompt,
};

/// Build a store from configuration: sample rules or an empty rule set
pub fn build_store(
    config: &crate::config::AppConfig,
    prompt: std::sync::Arc<dyn UserPrompt>,
) -> anyhow::Result<RuleSetStore> {
    let mut store = RuleSetStore::new(prompt).with_strict_bounds(config.editor.strict_bounds);
    if config.editor.load_sample {
        seed::load_seed_data(&mut store, config.editor.known_types.clone())?;
    } else {
        store.initialize(UserConfig::new(), config.editor.known_types.clone());
    }
    Ok(store)
}
