// sapclose/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sapclose")]
#[command(about = "SAP open-item closing reconciliation and reporting", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs the closing reconciliation (Exports -> Cases -> Rules -> Reports)
    Run {
        /// Project directory containing closing_conf.yaml and rules.yaml
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Run date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        run_date: Option<NaiveDate>,
    },

    /// ✅ Validates configuration and rule set without processing anything
    Validate {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🗓️ Shows or updates the persisted run state (last run date)
    State {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Set the last run date (YYYY-MM-DD) instead of showing it
        #[arg(long)]
        set_last_run: Option<NaiveDate>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["sapclose", "run"]);
        match args.command {
            Commands::Run {
                project_dir,
                run_date,
            } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                assert_eq!(run_date, None);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_with_date() -> Result<()> {
        let args = Cli::parse_from([
            "sapclose",
            "run",
            "--run-date",
            "2022-05-13",
            "--project-dir",
            "/tmp",
        ]);
        match args.command {
            Commands::Run {
                project_dir,
                run_date,
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(
                    run_date,
                    NaiveDate::from_ymd_opt(2022, 5, 13)
                );
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_invalid_date_rejected() {
        assert!(Cli::try_parse_from(["sapclose", "run", "--run-date", "13.05.2022"]).is_err());
    }

    #[test]
    fn test_cli_parse_state_set() -> Result<()> {
        let args = Cli::parse_from(["sapclose", "state", "--set-last-run", "2022-05-01"]);
        match args.command {
            Commands::State { set_last_run, .. } => {
                assert_eq!(set_last_run, NaiveDate::from_ymd_opt(2022, 5, 1));
                Ok(())
            }
            _ => bail!("Expected State command"),
        }
    }
}
