// sapclose/src/commands/state.rs
//
// USE CASE: Inspect or adjust the persisted run state. Re-running a past
// window starts with resetting last_run here.

use std::path::PathBuf;

use chrono::NaiveDate;

use sapclose_core::infrastructure::config::{RunStates, load_states, save_states};

pub fn execute(project_dir: PathBuf, set_last_run: Option<NaiveDate>) -> anyhow::Result<()> {
    let states_path = project_dir.join("states.json");

    match set_last_run {
        Some(date) => {
            save_states(
                &states_path,
                &RunStates {
                    last_run: Some(date),
                },
            )?;
            println!("✨ Last run set to {date}.");
        }
        None => {
            let states = load_states(&states_path)?;
            match states.last_run {
                Some(date) => println!("Last run: {date}"),
                None => println!("No previous run recorded."),
            }
        }
    }

    Ok(())
}
