use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Abstraction for managing a disposable closing project copied from the
/// fixture directory.
struct ClosingTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl ClosingTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/closing_demo");

        let dest = tmp.path().join("closing_demo");
        Self::copy_dir(&fixture, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &PathBuf, dst: &PathBuf) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn sapclose(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sapclose"));
        cmd.current_dir(&self.root);
        cmd
    }

    fn run_for_may_13(&self) -> Command {
        let mut cmd = self.sapclose();
        cmd.args(["run", "--run-date", "2022-05-13"]);
        cmd
    }

    /// Appends raw text to one of the project files.
    fn append(&self, relative: &str, text: &str) -> Result<()> {
        let path = self.root.join(relative);
        let mut content = fs::read_to_string(&path)?;
        content.push_str(text);
        fs::write(&path, content)?;
        Ok(())
    }

    fn patch(&self, relative: &str, from: &str, to: &str) -> Result<()> {
        let path = self.root.join(relative);
        let content = fs::read_to_string(&path)?;
        fs::write(&path, content.replace(from, to))?;
        Ok(())
    }
}

#[test]
fn test_full_run_distributes_reports_per_group() -> Result<()> {
    let env = ClosingTestEnv::new()?;

    env.run_for_may_13().assert().success();

    let share = env.root.join("share/2022-05-13");
    let de = fs::read_to_string(share.join("closing_DE_CC01.csv"))
        .context("DE report not distributed")?;
    let at = fs::read_to_string(share.join("closing_AT_CC02.csv"))
        .context("AT report not distributed")?;
    let unassigned = fs::read_to_string(share.join("closing_Unassigned_Unassigned.csv"))
        .context("Unassigned report not distributed")?;

    // FR is switched off in rules.yaml
    assert!(!share.join("closing_FR_CC03.csv").exists());

    // stable column layout across every report of the run
    let header = de.lines().next().unwrap_or_default().to_string();
    insta::assert_snapshot!(header, @"Document Number;Document Assignment;Clearing Document;DC Amount;Company Code;Country;Created On;Case ID;Status Sales;Disputed Amount;Root Cause;Status;Message;Warnings");
    assert_eq!(at.lines().next(), Some(header.as_str()));
    assert_eq!(unassigned.lines().next(), Some(header.as_str()));

    // DE: two open items sharing the dispute case, plus one cleared line
    // without dispute data
    assert_eq!(de.lines().count(), 4);
    assert!(de.contains(
        "4100001;A1;;-1234.56;CC01;DE;02.05.2022;900042;Disputed;1234.56;L06;Open;Credit note issued, awaiting clearing.;"
    ));
    assert!(de.contains("4100004;D1;2000031;-150.00;CC01;DE;28.04.2022;;;;;Unresolved;;"));

    // AT: mapped through the status map, flagged below threshold
    assert!(at.contains(
        "4100002;B1;;-89.90;CC02;AT;03.05.2022;900050;Solved;89.90;L14;Solved;Disputed amount below country threshold.;"
    ));

    // the orphan dispute case survives into its own bucket with its warning
    assert!(unassigned.contains(
        "4999999;Z9;;;;;;900060;Disputed;75.00;L14;Open;Disputed amount below country threshold.;ORPHAN_CASE"
    ));

    // staging was drained by the upload
    let leftover: Vec<_> = fs::read_dir(env.root.join("staging"))?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "csv"))
        .collect();
    assert!(leftover.is_empty());

    // the run state advanced
    let states = fs::read_to_string(env.root.join("states.json"))?;
    assert!(states.contains("2022-05-13"));

    Ok(())
}

#[test]
fn test_notification_artifacts_written_without_sending() -> Result<()> {
    let env = ClosingTestEnv::new()?;

    env.run_for_may_13().assert().success();

    let notifications = env.root.join("notifications");
    let body = fs::read_to_string(notifications.join("notification.html"))?;
    let summary = fs::read_to_string(notifications.join("summary.html"))?;

    assert!(body.contains("Closing run of 13-May-2022."));
    assert!(body.contains("share/2022-05-13"));
    // every placeholder was substituted
    assert!(!body.contains('$'));

    // one summary row per report group
    assert_eq!(summary.matches("<tr>").count(), 3);

    // sending is off in the fixture: no outbox
    assert!(!notifications.join("outbox").exists());

    Ok(())
}

#[test]
fn test_sending_scopes_notifications_to_recipient_interest() -> Result<()> {
    let env = ClosingTestEnv::new()?;
    env.patch("closing_conf.yaml", "send: false", "send: true")?;

    env.run_for_may_13().assert().success();

    let outbox = env.root.join("notifications/outbox");
    let jan = fs::read_to_string(outbox.join("jan_novak_example_com.html"))?;
    let eva = fs::read_to_string(outbox.join("eva_weber_example_com.html"))?;

    assert!(jan.contains("Subject: Closing results 13-May-2022"));
    // interest "All" sees every group, a DE-only recipient sees only DE
    assert!(jan.contains(">AT</td>"));
    assert!(eva.contains(">DE</td>"));
    assert!(!eva.contains(">AT</td>"));

    Ok(())
}

#[test]
fn test_misspelled_rule_field_fails_before_any_processing() -> Result<()> {
    let env = ClosingTestEnv::new()?;
    env.append(
        "rules.yaml",
        r#"
  - name: misspelled
    when:
      equals: { field: Amount_DC, value: "0" }
    then:
      set_status: open
"#,
    )?;

    env.sapclose()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Amount_DC"));

    env.run_for_may_13()
        .assert()
        .failure()
        .stderr(predicates::str::contains("unknown field 'Amount_DC'"));

    // nothing reached the distribution location
    assert!(!env.root.join("share").exists());

    Ok(())
}

#[test]
fn test_malformed_export_aborts_run_naming_file_and_line() -> Result<()> {
    let env = ClosingTestEnv::new()?;
    env.append("exports/FBL5N_open.txt", "4100099|X1|oops\n")?;

    env.run_for_may_13()
        .assert()
        .failure()
        .stderr(predicates::str::contains("FBL5N_open.txt"))
        .stderr(predicates::str::contains("line 6"));

    assert!(!env.root.join("share").exists());

    Ok(())
}

#[test]
fn test_concurrent_run_for_same_date_is_locked_out() -> Result<()> {
    let env = ClosingTestEnv::new()?;

    let staging = env.root.join("staging");
    fs::create_dir_all(&staging)?;
    fs::write(staging.join("closing_2022-05-13.lock"), "")?;

    env.run_for_may_13()
        .assert()
        .failure()
        .stderr(predicates::str::contains("already in progress"));

    Ok(())
}

#[test]
fn test_template_authoring_error_spares_the_reports() -> Result<()> {
    let env = ClosingTestEnv::new()?;
    env.append("template.html", "<p>Dear $recipient_name$</p>\n")?;

    // notification fails, the run itself does not
    env.run_for_may_13()
        .assert()
        .success()
        .stderr(predicates::str::contains("$recipient_name$"));

    // reports were produced and uploaded regardless
    assert!(
        env.root
            .join("share/2022-05-13/closing_DE_CC01.csv")
            .exists()
    );
    // the half-composed notification artifact was not left behind
    assert!(!env.root.join("notifications/notification.html").exists());

    Ok(())
}

#[test]
fn test_validate_reports_project_shape() -> Result<()> {
    let env = ClosingTestEnv::new()?;

    env.sapclose()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicates::str::contains("Configuration valid"))
        .stdout(predicates::str::contains("3 rules"));

    Ok(())
}

#[test]
fn test_state_subcommand_round_trip() -> Result<()> {
    let env = ClosingTestEnv::new()?;

    env.sapclose()
        .arg("state")
        .assert()
        .success()
        .stdout(predicates::str::contains("No previous run recorded."));

    env.sapclose()
        .args(["state", "--set-last-run", "2022-05-01"])
        .assert()
        .success();

    env.sapclose()
        .arg("state")
        .assert()
        .success()
        .stdout(predicates::str::contains("Last run: 2022-05-01"));

    Ok(())
}

#[test]
fn test_missing_primary_export_aborts() -> Result<()> {
    let env = ClosingTestEnv::new()?;
    fs::remove_file(env.root.join("exports/FBL5N_open.txt"))?;

    env.run_for_may_13()
        .assert()
        .failure()
        .stderr(predicates::str::contains("FBL5N_open.txt"));

    Ok(())
}
