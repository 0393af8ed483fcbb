use itertools::Itertools;
use rule_set_editor::config::AppConfig;
use rule_set_editor::{
    build_store, CaseType, ConsolePrompt, FieldCache, FieldLookup, RuleSetStore,
    SampleFieldSource, Section, ValidationErrorType,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Default to Info, RUST_LOG overrides
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Rule Set Editor");

    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: {} rule types [{}]",
        config.editor.known_types.len(),
        config.editor.known_types.iter().join(", ")
    );

    let prompt = Arc::new(ConsolePrompt::new(config.editor.auto_confirm));
    let mut store = build_store(&config, prompt)?;
    print_summary(&store);

    run_session(&mut store)?;
    lookup_fields(&config).await?;

    Ok(())
}

/// Walk through a short editing session: add a group, hit the validation gate, fix it, save
fn run_session(store: &mut RuleSetStore) -> anyhow::Result<()> {
    let Some(rule_type) = store.known_types().first().cloned() else {
        println!("No rule types configured");
        return Ok(());
    };

    store.select_type(&rule_type)?;
    if !store.has_rules(&rule_type) {
        store.create_new_rule(&rule_type)?;
    }

    store.add_or_group(&rule_type)?;
    let group = store.get_rule_count(&rule_type) - 1;
    println!(
        "\nAdded OR group #{} to {} (dirty: {})",
        group + 1,
        rule_type,
        store.is_dirty(&rule_type)
    );

    if let Err(e) = store.save_all() {
        println!("Save refused: {}", e);
    }

    fill_missing(store)?;
    let commit = store.save_all()?;
    println!(
        "Saved {} rule types as {} (dirty: {})",
        commit.rule_types.len(),
        &commit.hash[..12],
        store.is_form_dirty()
    );

    println!(
        "\nCommitted rules:\n{}",
        serde_json::to_string_pretty(store.snapshot())?
    );
    print_summary(store);
    Ok(())
}

/// Fill every empty field and value the validator reports, across all invalid types
fn fill_missing(store: &mut RuleSetStore) -> anyhow::Result<()> {
    for rule_type in store.invalid_types() {
        let Some(report) = store.validation_report(&rule_type) else {
            continue;
        };
        for error in &report.errors {
            println!("  {}: {}", rule_type, error.message);
            let (group, condition) = (error.group_index, error.condition_index);
            match error.error_type {
                ValidationErrorType::MissingField => {
                    store.set_field(&rule_type, group, condition, "priority")?
                }
                ValidationErrorType::MissingValue => {
                    store.set_value(&rule_type, group, condition, "high")?
                }
            }
        }
    }
    Ok(())
}

async fn lookup_fields(config: &AppConfig) -> anyhow::Result<()> {
    let cache = FieldCache::new(SampleFieldSource::new(config.field_latency()));

    if let FieldLookup::Pending(handle) = cache.request(Section::Section1, CaseType::A) {
        println!("\nFetching fields for Section1_A...");
        handle.await?;
    }

    if let FieldLookup::Ready(fields) = cache.request(Section::Section1, CaseType::A) {
        println!("Fields for Section1_A (cached): {}", fields.iter().join(", "));
    }

    Ok(())
}

fn print_summary(store: &RuleSetStore) {
    println!("\nRule types:");
    for summary in store.type_summaries() {
        let mut flags = Vec::new();
        if summary.selected {
            flags.push("selected");
        }
        if summary.dirty {
            flags.push("modified");
        }
        if summary.has_error {
            flags.push("error");
        }
        let count = if summary.has_rules {
            summary.rule_count.to_string()
        } else {
            "-".to_string()
        };
        println!("  {:<14} {:>2}  {}", summary.name, count, flags.iter().join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rule_set_editor::ScriptedPrompt;

    fn session_store(load_sample: bool) -> RuleSetStore {
        let mut config = AppConfig::default();
        config.editor.load_sample = load_sample;
        build_store(&config, Arc::new(ScriptedPrompt::default())).unwrap()
    }

    #[test]
    fn test_session_from_empty_rule_set_saves() {
        let mut store = session_store(false);
        run_session(&mut store).unwrap();

        assert_eq!(store.history().len(), 1);
        assert!(!store.is_form_dirty());
        assert!(store.invalid_types().is_empty());
        assert_eq!(store.snapshot()["TYPE_A_RULE"].children.len(), 2);
    }

    #[test]
    fn test_session_from_sample_saves() {
        let mut store = session_store(true);
        let groups = store.get_rule_count("TYPE_A_RULE");
        run_session(&mut store).unwrap();

        assert_eq!(store.history().len(), 1);
        assert_eq!(store.snapshot()["TYPE_A_RULE"].children.len(), groups + 1);
        let added = &store.snapshot()["TYPE_A_RULE"].children[groups].children[0];
        assert_eq!(added.field, "priority");
        assert_eq!(added.value, "high");
    }
}
