use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use archive_dir::config::ConfigManager;
use archive_dir::handlers;
use archive_dir::lifecycle::Operation;
use archive_dir::logger;

#[derive(Parser)]
#[command(name = "archive-dir")]
#[command(about = "Handles the archiving of user directories", long_about = None)]
#[command(version)]
struct Cli {
    /// Operation to perform
    #[arg(value_enum)]
    command: Operation,

    /// Directory on which the command operates. For restore and remove_archive
    /// this is the path that was originally archived, not the archive file.
    path: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging is best effort; a missing home directory is reported by the command itself
    let log_path = ConfigManager::log_file_path().ok().filter(|path| {
        path.parent()
            .is_some_and(|dir| std::fs::create_dir_all(dir).is_ok())
    });
    if let Some(path) = &log_path {
        if let Err(e) = logger::init_logger(path) {
            eprintln!("{} failed to initialize logging: {e:#}", "warning:".yellow());
        }
    }

    let result = handlers::handle_command(cli.command, &cli.path);

    if let Some(path) = &log_path {
        let line = match &result {
            Ok(outcome) => format!("{} {} -> {outcome:?}", cli.command, cli.path.display()),
            Err(e) => format!("{} {} -> error: {e}", cli.command, cli.path.display()),
        };
        if let Err(e) = logger::log_to_file(path, &line) {
            log::warn!("{e:#}");
        }
    }

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::from(e.exit_code())
        }
    }
}
