use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mgrt::cli::{add, init, list, log, reset, run};
use mgrt::config::Config;
use mgrt::revision::DirSource;
use mgrt::{Error, RevisionSource, RevisionStore};

#[derive(Parser)]
#[command(name = "mgrt")]
#[command(about = "Ordered, reversible SQL revisions with a tamper-evident tracking log")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = "mgrt.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the revisions tracking table
    Init,

    /// Add a new, empty revision
    Add {
        /// Revision message
        #[arg(short, long, default_value = "")]
        message: String,
    },

    /// Perform revisions that are not yet applied
    Run {
        /// Revision IDs (all revisions when omitted)
        ids: Vec<String>,

        /// Perform even if a revision changed since it was last performed
        #[arg(short, long)]
        force: bool,
    },

    /// Roll back applied revisions
    Reset {
        /// Revision IDs (all revisions when omitted)
        ids: Vec<String>,

        /// Roll back even if a revision changed since it was last performed
        #[arg(short, long)]
        force: bool,
    },

    /// Show the log of performed revisions
    Log {
        /// Revision IDs (whole log when omitted)
        ids: Vec<String>,

        /// Newest first
        #[arg(short, long)]
        reverse: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List revisions and their state
    Ls,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mgrt: {:#}", err);
            exit_code(&err)
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    // Load config
    let config = Config::load(&cli.config).context("failed to load config")?;

    let source = DirSource::new(config.revisions_path());

    match cli.command {
        Commands::Init => init::run(&mut open(&config)?)?,
        Commands::Add { message } => add::run(&source, &message)?,
        Commands::Run { ids, force } => run::run(&mut open(&config)?, &source, &ids, force)?,
        Commands::Reset { ids, force } => reset::run(&mut open(&config)?, &source, &ids, force)?,
        Commands::Log { ids, reverse, json } => log::run(
            &mut open(&config)?,
            Some(&source as &dyn RevisionSource),
            &ids,
            reverse,
            json,
        )?,
        Commands::Ls => list::run(&mut open(&config)?, &source)?,
    }

    Ok(())
}

fn open(config: &Config) -> Result<RevisionStore> {
    mgrt::store::open(&config.database).context("failed to open database")
}

/// Integrity and "not initialized" failures get their own exit codes.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<Error>() {
        Some(Error::NotInitialized(_)) => ExitCode::from(2),
        Some(Error::CheckHashFailed { .. }) => ExitCode::from(3),
        _ => ExitCode::FAILURE,
    }
}
