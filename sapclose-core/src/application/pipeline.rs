// sapclose-core/src/application/pipeline.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::SapcloseError;

// Domain
use crate::domain::grouping::partition_reports;
use crate::domain::merge::CaseMerger;
use crate::domain::model::ClosingCase;
use crate::domain::notify::{
    NOTIFICATION_DATE_FORMAT, PlaceholderValues, RunSummary, compose_notifications,
    render_summary_rows, render_template,
};
use crate::domain::report::assemble;
use crate::domain::rules::{RuleEngine, RuleSet};

// Infrastructure
use crate::infrastructure::config::{AppConfig, RulesFile};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::export::{read_case_records, read_line_items};
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::runlock::RunLock;

// Ports
use crate::ports::{Mailer, OutboundMessage, ReportWriter, ShareUploader};

/// Bounded fan-out for per-case classification.
const CLASSIFY_PARALLELISM: usize = 8;

#[derive(Debug)]
pub struct RunResult {
    pub run_date: NaiveDate,
    pub summary: RunSummary,
    /// Cases dropped because their country is switched off in rules.yaml.
    pub excluded_cases: usize,
    pub duplicate_lines: usize,
    pub orphan_cases: usize,
    /// Final locations of the distributed reports.
    pub reports: Vec<PathBuf>,
    pub notifications_sent: usize,
    /// Set when notification composition or delivery failed. Reports are
    /// produced and uploaded regardless — the two audiences carry different
    /// risk profiles.
    pub notification_error: Option<String>,
}

/// The whole closing run, start to finish. Aborts without touching the
/// distribution location on any parsing or rule-validation failure; per-case
/// anomalies are warnings on the affected case, never run failures.
pub async fn run_closing(
    config: &AppConfig,
    rules: &RulesFile,
    run_date: NaiveDate,
    writer: &dyn ReportWriter,
    uploader: &dyn ShareUploader,
    mailer: &dyn Mailer,
) -> Result<RunResult, SapcloseError> {
    // 1. LOCK — one run per extraction window
    let _lock = RunLock::acquire(Path::new(&config.reports.local_report_dir), run_date)?;

    // 2. RULE VALIDATION — before any case is touched
    let rule_set = rules.rule_set();
    rule_set.validate()?;

    // 3. NORMALIZATION — the two exports are independent, parse them in
    // parallel; the merger below is the join point.
    let (line_items, case_records) = normalize_exports(config).await?;
    info!(
        line_items = line_items.len(),
        case_records = case_records.len(),
        "Exports normalized"
    );

    // 4. MERGE
    let outcome = CaseMerger::merge(&line_items, &case_records);
    if outcome.duplicate_lines > 0 {
        warn!(events = outcome.duplicate_lines, "Duplicate line overwrites recorded");
    }
    if outcome.orphan_cases > 0 {
        warn!(count = outcome.orphan_cases, "Dispute cases without accounting lines");
    }

    // 5. COUNTRY SWITCHES (rules.yaml)
    let inactive = rules.inactive_countries();
    let mut cases = Vec::with_capacity(outcome.cases.len());
    let mut excluded_cases = 0;
    for case in outcome.cases {
        let switched_off = case
            .country
            .as_deref()
            .is_some_and(|c| inactive.iter().any(|i| i == c));
        if switched_off {
            excluded_cases += 1;
        } else {
            cases.push(case);
        }
    }
    if excluded_cases > 0 {
        warn!(excluded_cases, "Cases excluded per country settings in rules.yaml");
    }

    // 6. CLASSIFICATION — parallel across cases, strictly sequential within
    // one case (later rules read fields set by earlier ones).
    let rule_set = Arc::new(rule_set);
    let classified = classify_all(cases, rule_set, run_date).await?;

    let summary = RunSummary::collect(classified.iter(), run_date);
    let groups = partition_reports(&classified);
    info!(cases = classified.len(), groups = groups.len(), "Cases classified");

    // 7. REPORTS — staged locally first; nothing reaches the share until
    // every group's file was written.
    let staging_dir = Path::new(&config.reports.local_report_dir);
    fs::create_dir_all(staging_dir).map_err(InfrastructureError::Io)?;

    let mut staged = Vec::with_capacity(groups.len());
    for group in &groups {
        let table = assemble(group, &classified, &config.reports.field_order);
        let file_name = config
            .reports
            .report_file_name(&group.key.country, &group.key.company_code);
        let target = staging_dir.join(file_name);
        writer.write(&table, &target, &config.reports.sheet_name)?;
        staged.push(target);
    }

    // 8. UPLOAD — all or nothing
    let dated_subdir = run_date
        .format(&config.reports.net_report_subdir_format)
        .to_string();
    let reports = uploader.upload(&staged, &dated_subdir)?;
    info!(count = reports.len(), subdir = %dated_subdir, "Reports distributed");

    // 9. NOTIFICATION — isolated failure domain: the reports above are
    // already distributed and stay valid even if this part fails.
    let report_location = Path::new(&config.reports.net_report_dir)
        .join(&dated_subdir)
        .display()
        .to_string();
    let (notifications_sent, notification_error) =
        match notify(config, &classified, run_date, &report_location, mailer) {
            Ok(sent) => (sent, None),
            Err(e) => {
                warn!(error = %e, "Notification failed; reports were still distributed");
                (0, Some(e.to_string()))
            }
        };

    Ok(RunResult {
        run_date,
        summary,
        excluded_cases,
        duplicate_lines: outcome.duplicate_lines,
        orphan_cases: outcome.orphan_cases,
        reports,
        notifications_sent,
        notification_error,
    })
}

async fn normalize_exports(
    config: &AppConfig,
) -> Result<
    (
        Vec<crate::domain::model::RawLineItem>,
        Vec<crate::domain::model::RawCaseRecord>,
    ),
    SapcloseError,
> {
    let delimiter = config.data.delimiter as u8;
    let fbl5n_paths = config.data.fbl5n_export_paths();
    let dms_path = config.data.dms_export_path();

    let fbl5n_task = tokio::task::spawn_blocking(move || {
        let mut items = Vec::new();
        for (idx, path) in fbl5n_paths.iter().enumerate() {
            if !path.is_file() {
                if idx == 0 {
                    // the primary sub-export must exist; there are always
                    // open items on the accounts
                    return Err(InfrastructureError::ExportNotFound(
                        path.display().to_string(),
                    ));
                }
                warn!(file = %path.display(), "Secondary sub-export missing, skipping");
                continue;
            }
            items.extend(read_line_items(path, delimiter)?);
        }
        Ok(items)
    });
    let dms_task = tokio::task::spawn_blocking(move || read_case_records(&dms_path, delimiter));

    let (line_items, case_records) = tokio::try_join!(fbl5n_task, dms_task)
        .map_err(|e| SapcloseError::InternalError(format!("normalizer task failed: {e}")))?;

    Ok((line_items?, case_records?))
}

/// Splits the case set into chunks and classifies them on blocking worker
/// threads. Chunk order is preserved, so merger insertion order survives
/// into the reports.
async fn classify_all(
    mut cases: Vec<ClosingCase>,
    rule_set: Arc<RuleSet>,
    run_date: NaiveDate,
) -> Result<Vec<ClosingCase>, SapcloseError> {
    if cases.is_empty() {
        return Ok(cases);
    }

    let chunk_size = cases.len().div_ceil(CLASSIFY_PARALLELISM);
    let mut handles = Vec::new();

    while !cases.is_empty() {
        let rest = if cases.len() > chunk_size {
            cases.split_off(chunk_size)
        } else {
            Vec::new()
        };
        let chunk = std::mem::replace(&mut cases, rest);
        let rules = Arc::clone(&rule_set);

        handles.push(tokio::task::spawn_blocking(move || {
            let engine = RuleEngine::new(&rules, run_date);
            let mut chunk = chunk;
            for case in &mut chunk {
                engine.classify(case);
            }
            chunk
        }));
    }

    let chunks = futures::future::try_join_all(handles)
        .await
        .map_err(|e| SapcloseError::InternalError(format!("classification task: {e}")))?;
    Ok(chunks.into_iter().flatten().collect())
}

/// Writes the notification artifacts and, when sending is enabled, hands one
/// message per recipient to the mailer. Artifacts are produced even with
/// sending off, for dry-run verification.
fn notify(
    config: &AppConfig,
    cases: &[ClosingCase],
    run_date: NaiveDate,
    report_location: &str,
    mailer: &dyn Mailer,
) -> Result<usize, SapcloseError> {
    let notif = &config.notifications;
    let template = fs::read_to_string(&notif.template_path)
        .map_err(|_| InfrastructureError::ConfigNotFound(notif.template_path.clone()))?;

    let notification_dir = Path::new(&notif.notification_dir);
    fs::create_dir_all(notification_dir).map_err(InfrastructureError::Io)?;

    // global artifacts: the run-wide summary rows and the rendered body
    let all_indexes: Vec<usize> = (0..cases.len()).collect();
    let summary_rows = render_summary_rows(cases, &all_indexes);
    atomic_write(notification_dir.join(&notif.summary_name), &summary_rows)?;

    let values = PlaceholderValues {
        date: run_date.format(NOTIFICATION_DATE_FORMAT).to_string(),
        report_path: report_location.to_string(),
        summary_rows,
    };
    let body = render_template(&template, &values)?;
    atomic_write(notification_dir.join(&notif.notification_name), &body)?;

    let notifications = compose_notifications(
        cases,
        &notif.recipients,
        &template,
        &notif.subject,
        report_location,
        run_date,
    )?;

    if !notif.send {
        warn!("Notification sending switched off; artifacts written, no mail goes out");
        return Ok(0);
    }

    let mut sent = 0;
    for notification in &notifications {
        mailer.deliver(&OutboundMessage {
            sender: notif.sender.clone(),
            recipient: notification.recipient_mail.clone(),
            subject: notification.subject.clone(),
            html_body: notification.html_body.clone(),
        })?;
        sent += 1;
    }

    Ok(sent)
}
