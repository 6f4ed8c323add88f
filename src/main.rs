use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dbvault::cli::{exit_code, handle_backup_command, BackupCommands, TargetArgs};
use dbvault::config::{paths::VaultPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "dbvault",
    author = "Kaylee Beyene",
    version,
    about = "Back up and restore a SQLite database to remote folder storage",
    long_about = "dbvault checkpoints a live SQLite database, packages it as a zip \
                  snapshot and keeps only the latest snapshot in a remote folder. \
                  Restores pick the newest snapshot whose version is still \
                  compatible and replace the database with its -wal/-shm files."
)]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,

    #[command(subcommand)]
    command: Option<BackupCommands>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = VaultPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    cli.target.apply(&mut settings);
    settings.backup.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(cmd) => {
            let outcome = handle_backup_command(&paths, &settings, &cli.target, cmd).await?;
            Ok(ExitCode::from(exit_code(outcome)))
        }
        None => {
            println!("dbvault - SQLite snapshot backup and restore");
            println!();
            println!("Run 'dbvault --help' for usage information.");
            println!("Run 'dbvault --db <path> backup' to take a snapshot.");
            Ok(ExitCode::SUCCESS)
        }
    }
}
