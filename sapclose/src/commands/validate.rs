// sapclose/src/commands/validate.rs
//
// USE CASE: Check configuration and rules without touching any export.

use std::path::PathBuf;

use anyhow::Context;

use sapclose_core::infrastructure::config::{load_app_config, load_rules};

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    println!("🔍 Validating project at '{}'...", project_dir.display());

    let config = load_app_config(&project_dir.join("closing_conf.yaml"))
        .with_context(|| format!("Failed to load closing configuration from {:?}", project_dir))?;
    println!(
        "   ✅ Configuration valid ({} report fields, {} recipients)",
        config.reports.field_order.len(),
        config.notifications.recipients.len()
    );

    let rules = load_rules(&project_dir.join("rules.yaml"))?;
    rules.rule_set().validate()?;
    println!(
        "   ✅ Rule set valid ({} rules, {} status mappings, {} country switches)",
        rules.rules.len(),
        rules.status_map.len(),
        rules.countries.len()
    );

    println!("✨ Project is ready to run.");
    Ok(())
}
