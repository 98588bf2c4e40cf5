//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::session::Session;
use crate::storage::{Config, TaskFile};

#[derive(Parser)]
#[command(name = "taskline")]
#[command(author, version, about = "A task list driven by free-text commands, with undo")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Task file to use instead of the configured one
    #[arg(long, global = true, env = "TASKLINE_FILE")]
    pub file: Option<PathBuf>,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, env = "TASKLINE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive session (the default)
    Shell,

    /// Run command lines in one session, e.g. `exec "add milk" "due 1 friday"`
    Exec {
        /// Command lines, run in order
        #[arg(required = true)]
        lines: Vec<String>,
    },

    /// Print every stored task
    List,
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the level
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let output = Output::new(cli.format.unwrap_or(config.default_format), cli.verbose);

    let path = config.resolve_data_file(cli.file.as_deref())?;
    output.verbose_ctx("config", &format!("Task file: {}", path.display()));
    let mut session = Session::open(TaskFile::new(path), config.page_size)?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let stdin = std::io::stdin();
            session.repl(stdin.lock(), &output)?
        }
        Commands::Exec { lines } => exec(&mut session, &output, &lines)?,
        Commands::List => output.tasks(&session.all_rows()),
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Runs each line in order and saves once at the end
///
/// Stops at the first failing line. Changes made by the lines before it are
/// still saved.
fn exec(session: &mut Session, output: &Output, lines: &[String]) -> Result<()> {
    for (number, line) in lines.iter().enumerate() {
        output.verbose_ctx("exec", &format!("Running: {}", line));

        match session.run_line(line) {
            Ok(reply) => {
                output.success(&reply.message);
                if reply.exit {
                    break;
                }
            }
            Err(e) => {
                session.save()?;
                return Err(e).with_context(|| format!("Line {} '{}' failed", number + 1, line));
            }
        }
    }

    session.save()
}
