use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod report;

use config::Config;

#[derive(Parser)]
#[command(name = "cstreet", version, about = "Card-statement expense tracker")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "cstreet.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a statement file, classify its transactions and persist the
    /// resulting expenses.
    Load { file: PathBuf },
    /// Render the stored expenses as a table.
    Report,
    /// Export the stored expenses to a CSV file.
    Export { out: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    // The pool is the only database handle; it is created here once and
    // passed down explicitly.
    let pool = cstreet_storage::create_db(&config.database.path).await?;

    match cli.command {
        Command::Load { file } => {
            let rendered = commands::load(&config, &pool, &file).await?;
            println!("{rendered}");
        }
        Command::Report => {
            println!("{}", commands::show_report(&pool).await?);
        }
        Command::Export { out } => {
            commands::export(&pool, &out).await?;
        }
    }

    Ok(())
}
