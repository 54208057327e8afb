// sapclose/src/commands/run.rs
//
// USE CASE: Run the closing reconciliation end to end.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use comfy_table::Table;

use sapclose_core::application::{RunResult, run_closing};
use sapclose_core::infrastructure::adapters::{CsvReportWriter, DatedShareUploader, OutboxMailer};
use sapclose_core::infrastructure::config::{
    RunStates, load_app_config, load_rules, load_states, save_states,
};

pub async fn execute(project_dir: PathBuf, run_date: Option<NaiveDate>) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let config = load_app_config(&project_dir.join("closing_conf.yaml")).with_context(|| {
        format!(
            "Failed to load closing configuration from {:?}",
            project_dir
        )
    })?;
    let rules = load_rules(&project_dir.join("rules.yaml"))?;
    println!(
        "   Rules: {} | Recipients: {}",
        rules.rules.len(),
        config.notifications.recipients.len()
    );

    let states_path = project_dir.join("states.json");
    let states = load_states(&states_path)?;
    if let Some(last) = states.last_run {
        println!("   Last run: {last}");
    }
    let run_date = run_date.unwrap_or_else(|| chrono::Local::now().date_naive());
    println!(
        "   Run date: {run_date} (extraction window: {} days)",
        config.data.days_closed
    );

    // B. Wire the collaborator adapters
    let writer = CsvReportWriter::new();
    let uploader = DatedShareUploader::new(&config.reports.net_report_dir);
    let mailer = OutboxMailer::new(Path::new(&config.notifications.notification_dir).join("outbox"));

    // C. Run the Pipeline (Application Layer)
    println!("🟢 Processing closing run...");
    let result = run_closing(&config, &rules, run_date, &writer, &uploader, &mailer).await;

    match result {
        Ok(run_res) => {
            print_summary(&run_res);

            save_states(
                &states_path,
                &RunStates {
                    last_run: Some(run_date),
                },
            )?;

            if let Some(err) = &run_res.notification_error {
                eprintln!("\n⚠️  Notification failed: {err}");
            }
            println!("\n✨ SUCCESS! Closing finished in {:.2?}", start.elapsed());
        }
        Err(e) => {
            eprintln!("\n💥 CRITICAL CLOSING ERROR: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_summary(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec!["Status", "Cases"]);
    for (status, count) in &result.summary.status_counts {
        table.add_row(vec![status.to_string(), count.to_string()]);
    }
    table.add_row(vec![
        "Total".to_string(),
        result.summary.total_cases.to_string(),
    ]);
    println!("{table}");

    println!("   Reports distributed: {}", result.reports.len());
    println!(
        "   Cases with warnings: {} (duplicate line events: {}, orphan cases: {})",
        result.summary.warning_cases, result.duplicate_lines, result.orphan_cases
    );
    if result.excluded_cases > 0 {
        println!(
            "   Excluded per country settings: {}",
            result.excluded_cases
        );
    }
    println!(
        "   Total disputed amount: {}",
        result.summary.total_disputed.round(2)
    );
    println!("   Notifications sent: {}", result.notifications_sent);
}
