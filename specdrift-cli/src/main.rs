//! specdrift — spec-to-code compliance from the command line.
//!
//! `check` runs the pipeline once and exits 0 when no P1 gap exists,
//! 1 when one does, and 2 on operational failure. `watch` keeps a
//! debounced scheduler running over change signals read from stdin.
//! `report history` prints a module's recorded score trend.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{check, history, watch};

#[derive(Parser)]
#[command(name = "specdrift")]
#[command(version, about = "Detect drift between written specifications and shipped code")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one compliance check and print the report.
    Check {
        /// Restrict the check to these modules (repeatable).
        #[arg(long = "module")]
        modules: Vec<String>,
        /// Report format.
        #[arg(long, default_value = "console")]
        format: String,
        /// Rule file overriding the built-in rule set.
        #[arg(long)]
        rules: Option<String>,
        /// Code fact snapshot produced by the analyzer.
        #[arg(long, default_value = "code_facts.json")]
        code_facts: PathBuf,
        /// Specification corpus directory.
        #[arg(long)]
        spec_dir: Option<String>,
        /// Trend database path.
        #[arg(long)]
        db: Option<String>,
        /// Skip recording the report to the trend store.
        #[arg(long, default_value_t = false)]
        no_record: bool,
    },
    /// Watch for change signals on stdin (one module name per line) and
    /// re-check dirty modules after a quiet period.
    Watch {
        #[arg(long, default_value = "console")]
        format: String,
        #[arg(long)]
        rules: Option<String>,
        #[arg(long, default_value = "code_facts.json")]
        code_facts: PathBuf,
        #[arg(long)]
        spec_dir: Option<String>,
        #[arg(long)]
        db: Option<String>,
        /// Quiet period before a burst of signals triggers a check.
        #[arg(long)]
        debounce_ms: Option<u64>,
        /// Append rendered reports to this file instead of stdout.
        #[arg(long)]
        sink: Option<PathBuf>,
    },
    /// Inspect recorded reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Print a module's score history.
    History {
        /// Module to chart.
        #[arg(long)]
        module: String,
        /// Look-back window in days.
        #[arg(long, default_value_t = 30)]
        since_days: u32,
        #[arg(long, default_value = "console")]
        format: String,
        #[arg(long)]
        db: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("specdrift={default}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Check {
            modules,
            format,
            rules,
            code_facts,
            spec_dir,
            db,
            no_record,
        } => check::run(check::CheckArgs {
            modules,
            format,
            rules,
            code_facts,
            spec_dir,
            db,
            no_record,
        }),
        Commands::Watch {
            format,
            rules,
            code_facts,
            spec_dir,
            db,
            debounce_ms,
            sink,
        } => watch::run(watch::WatchArgs {
            format,
            rules,
            code_facts,
            spec_dir,
            db,
            debounce_ms,
            sink,
        }),
        Commands::Report { command } => match command {
            ReportCommands::History {
                module,
                since_days,
                format,
                db,
            } => history::run(history::HistoryArgs {
                module,
                since_days,
                format,
                db,
            }),
        },
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("specdrift: {e}");
            ExitCode::from(2)
        }
    }
}
