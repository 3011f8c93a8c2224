//! Watch mode: debounced incremental rechecks.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use specdrift_core::config::CliOverrides;
use specdrift_core::events::ReportRecordedEvent;
use specdrift_core::traits::CancellationToken;
use specdrift_engine::pipeline::{Pipeline, RunOutput};
use specdrift_engine::report::{create_reporter, Reporter};
use specdrift_engine::schedule::{ChangeSignal, RunSink, Scheduler};
use specdrift_storage::{record_report, Database};
use tracing::{info, warn};

use super::{build_pipeline, load_config, open_database, CliResult};

pub struct WatchArgs {
    pub format: String,
    pub rules: Option<String>,
    pub code_facts: PathBuf,
    pub spec_dir: Option<String>,
    pub db: Option<String>,
    pub debounce_ms: Option<u64>,
    pub sink: Option<PathBuf>,
}

/// Emits each run's rendered report (stdout, or appended to a sink
/// file) and appends the report to the trend store.
struct WatchSink {
    reporter: Box<dyn Reporter>,
    db: Database,
    pipeline: Arc<Pipeline>,
    sink_path: Option<PathBuf>,
}

impl WatchSink {
    fn emit_rendered(&self, rendered: &str) {
        match &self.sink_path {
            Some(path) => {
                let appended = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .and_then(|mut file| writeln!(file, "{rendered}"));
                if let Err(e) = appended {
                    warn!(sink = %path.display(), error = %e, "writing to sink failed");
                }
            }
            None => println!("{rendered}"),
        }
    }
}

impl RunSink for WatchSink {
    fn accept(&self, output: &RunOutput) {
        match self.reporter.generate(&output.report) {
            Ok(rendered) => self.emit_rendered(&rendered),
            Err(e) => warn!(error = %e, "report rendering failed"),
        }
        match record_report(&self.db, &output.report) {
            Ok(()) => self
                .pipeline
                .events()
                .emit_report_recorded(&ReportRecordedEvent {
                    run_id: output.report.run_id.clone(),
                }),
            Err(e) => warn!(error = %e, "recording report failed"),
        }
    }
}

pub fn run(args: WatchArgs) -> CliResult<ExitCode> {
    let reporter = create_reporter(&args.format)
        .ok_or_else(|| format!("unknown report format '{}'", args.format))?;

    let config = load_config(CliOverrides {
        rules_file: args.rules,
        corpus_dir: args.spec_dir,
        db_path: args.db,
        debounce_ms: args.debounce_ms,
        ..CliOverrides::default()
    })?;
    let debounce = Duration::from_millis(config.schedule.effective_debounce_ms());
    let db = open_database(&config)?;
    let pipeline = Arc::new(build_pipeline(config, &args.code_facts)?);

    let scheduler = Scheduler::new(pipeline.clone(), debounce);
    let sink = WatchSink {
        reporter,
        db,
        pipeline,
        sink_path: args.sink,
    };
    let cancel = CancellationToken::new();

    let (tx, rx) = crossbeam_channel::unbounded();
    let reader = std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let module = line.trim();
            if module.is_empty() {
                continue;
            }
            if tx.send(ChangeSignal::module(module)).is_err() {
                break;
            }
        }
        // Dropping the sender drains the scheduler and stops the loop.
    });

    info!("watching for change signals on stdin (module name per line)");
    scheduler.run_loop(&rx, &sink, &cancel)?;
    let _ = reader.join();

    Ok(ExitCode::SUCCESS)
}
