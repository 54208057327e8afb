// sapclose-core/src/domain/notify.rs

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::OnceLock;

use crate::domain::error::DomainError;
use crate::domain::grouping::{GroupKey, partition_for_recipient};
use crate::domain::model::{ClosingCase, Recipient, Status};

/// Date layout used in the notification subject and body.
pub const NOTIFICATION_DATE_FORMAT: &str = "%d-%b-%Y";

/// Counts describing one run (or one recipient's view of it).
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_date: NaiveDate,
    pub total_cases: usize,
    pub status_counts: Vec<(Status, usize)>,
    pub warning_cases: usize,
    /// Cases with no dispute record at all.
    pub unmatched_cases: usize,
    pub total_disputed: BigDecimal,
}

impl RunSummary {
    pub fn collect<'a>(
        cases: impl Iterator<Item = &'a ClosingCase>,
        run_date: NaiveDate,
    ) -> Self {
        let mut total_cases = 0;
        let mut warning_cases = 0;
        let mut unmatched_cases = 0;
        let mut total_disputed = BigDecimal::from(0);
        let mut counts: Vec<(Status, usize)> =
            Status::ALL.iter().map(|s| (*s, 0usize)).collect();

        for case in cases {
            total_cases += 1;
            if !case.warnings.is_empty() {
                warning_cases += 1;
            }
            if !case.has_case_data() {
                unmatched_cases += 1;
            }
            if let Some(amount) = &case.disputed_amount {
                total_disputed += amount;
            }
            if let Some(status) = case.status
                && let Some(slot) = counts.iter_mut().find(|(s, _)| *s == status)
            {
                slot.1 += 1;
            }
        }

        Self {
            run_date,
            total_cases,
            status_counts: counts,
            warning_cases,
            unmatched_cases,
            total_disputed,
        }
    }

    pub fn count_for(&self, status: Status) -> usize {
        self.status_counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// The closed set of placeholders the composer populates. Any other `$...$`
/// token in a template is an authoring error and fails composition before
/// any mail goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Date,
    ReportPath,
    SummaryRows,
}

impl Placeholder {
    pub const ALL: [Placeholder; 3] = [
        Placeholder::Date,
        Placeholder::ReportPath,
        Placeholder::SummaryRows,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::Date => "$date$",
            Self::ReportPath => "$report_path$",
            Self::SummaryRows => "$summary_rows$",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "date" => Some(Self::Date),
            "report_path" => Some(Self::ReportPath),
            "summary_rows" => Some(Self::SummaryRows),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderValues {
    pub date: String,
    pub report_path: String,
    pub summary_rows: String,
}

impl PlaceholderValues {
    fn get(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::Date => &self.date,
            Placeholder::ReportPath => &self.report_path,
            Placeholder::SummaryRows => &self.summary_rows,
        }
    }
}

#[allow(clippy::expect_used)]
fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // static literal, cannot fail at runtime
    PATTERN.get_or_init(|| Regex::new(r"\$([A-Za-z_]+)\$").expect("valid placeholder pattern"))
}

/// Substitutes the recognized placeholders into an externally supplied
/// template. Every `$token$` occurrence is checked against the closed set
/// first, so the failure mode is deterministic.
pub fn render_template(
    template: &str,
    values: &PlaceholderValues,
) -> Result<String, DomainError> {
    let pattern = placeholder_pattern();

    for capture in pattern.captures_iter(template) {
        let name = &capture[1];
        if Placeholder::from_name(name).is_none() {
            return Err(DomainError::TemplateFieldMissing {
                placeholder: format!("${name}$"),
            });
        }
    }

    let mut rendered = template.to_string();
    for placeholder in Placeholder::ALL {
        rendered = rendered.replace(placeholder.token(), values.get(placeholder));
    }

    Ok(rendered)
}

/// One HTML table row per (country, company code) partition of the given
/// case subset, in insertion order.
pub fn render_summary_rows(cases: &[ClosingCase], indexes: &[usize]) -> String {
    let mut order: Vec<GroupKey> = Vec::new();
    let mut members: Vec<Vec<usize>> = Vec::new();

    for &idx in indexes {
        let key = GroupKey::for_case(&cases[idx]);
        match order.iter().position(|k| *k == key) {
            Some(pos) => members[pos].push(idx),
            None => {
                order.push(key);
                members.push(vec![idx]);
            }
        }
    }

    let mut rows = String::new();
    for (key, group_indexes) in order.iter().zip(&members) {
        let summary = RunSummary::collect(
            group_indexes.iter().map(|&i| &cases[i]),
            // the per-group date is irrelevant for counting
            NaiveDate::MIN,
        );
        let cell = "style=\"border: 1px solid; padding: 5px\"";
        let _ = write!(
            rows,
            "<tr><td {cell}>{}</td><td {cell}>{}</td><td {cell}>{}</td>\
             <td {cell}>{}</td><td {cell}>{}</td><td {cell}>{}</td>\
             <td {cell}>{}</td><td {cell}>{}</td><td {cell}>{}</td></tr>\n",
            key.country,
            key.company_code,
            summary.total_cases,
            summary.count_for(Status::Open),
            summary.count_for(Status::Solved),
            summary.count_for(Status::Closed),
            summary.count_for(Status::Unresolved),
            summary.warning_cases,
            summary.total_disputed.round(2),
        );
    }

    rows
}

/// Plain text rendering of a run summary, used for the summary artifact and
/// for operators reading logs rather than HTML mail.
pub fn render_plain_summary(summary: &RunSummary) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Closing run {}", summary.run_date);
    let _ = writeln!(
        text,
        "Cases reconciled: {} ({} without dispute case)",
        summary.total_cases, summary.unmatched_cases
    );
    for (status, count) in &summary.status_counts {
        let _ = writeln!(text, "{}: {}", status, count);
    }
    let _ = writeln!(text, "Cases with warnings: {}", summary.warning_cases);
    let _ = writeln!(
        text,
        "Total disputed amount: {}",
        summary.total_disputed.round(2)
    );
    text
}

/// A fully rendered message for one recipient, ready for the mailer port.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub recipient_mail: String,
    pub subject: String,
    pub html_body: String,
    pub plain_summary: String,
}

/// Renders one notification per recipient, each scoped to the recipient's
/// country interest. Fails on the first template authoring error — reports
/// have already been produced by then and stay unaffected.
pub fn compose_notifications(
    cases: &[ClosingCase],
    recipients: &[Recipient],
    template: &str,
    subject_pattern: &str,
    report_path: &str,
    run_date: NaiveDate,
) -> Result<Vec<Notification>, DomainError> {
    let date = run_date.format(NOTIFICATION_DATE_FORMAT).to_string();
    let mut notifications = Vec::with_capacity(recipients.len());

    for recipient in recipients {
        let indexes = partition_for_recipient(cases, recipient);
        let scoped = RunSummary::collect(indexes.iter().map(|&i| &cases[i]), run_date);

        let values = PlaceholderValues {
            date: date.clone(),
            report_path: report_path.to_string(),
            summary_rows: render_summary_rows(cases, &indexes),
        };

        notifications.push(Notification {
            recipient_mail: recipient.mail.clone(),
            subject: render_template(subject_pattern, &values)?,
            html_body: render_template(template, &values)?,
            plain_summary: render_plain_summary(&scoped),
        });
    }

    Ok(notifications)
}
