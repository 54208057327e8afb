// sapclose/src/main.rs

mod cli;
mod commands;

use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug sapclose run ... pour voir les détails
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            run_date,
        } => commands::run::execute(project_dir, run_date).await,

        Commands::Validate { project_dir } => commands::validate::execute(project_dir),

        Commands::State {
            project_dir,
            set_last_run,
        } => commands::state::execute(project_dir, set_last_run),
    }
}
