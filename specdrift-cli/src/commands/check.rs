//! One-shot compliance check.

use std::path::PathBuf;
use std::process::ExitCode;

use specdrift_core::config::CliOverrides;
use specdrift_core::events::ReportRecordedEvent;
use specdrift_core::traits::CancellationToken;
use specdrift_engine::report::create_reporter;
use specdrift_storage::record_report;
use tracing::{info, warn};

use super::{build_pipeline, load_config, open_database, CliResult};

pub struct CheckArgs {
    pub modules: Vec<String>,
    pub format: String,
    pub rules: Option<String>,
    pub code_facts: PathBuf,
    pub spec_dir: Option<String>,
    pub db: Option<String>,
    pub no_record: bool,
}

pub fn run(args: CheckArgs) -> CliResult<ExitCode> {
    let reporter = create_reporter(&args.format)
        .ok_or_else(|| format!("unknown report format '{}'", args.format))?;

    let config = load_config(CliOverrides {
        rules_file: args.rules,
        corpus_dir: args.spec_dir,
        db_path: args.db,
        ..CliOverrides::default()
    })?;
    let retention_days = config.storage.effective_retention_days();
    let db = if args.no_record {
        None
    } else {
        Some(open_database(&config)?)
    };

    let pipeline = build_pipeline(config, &args.code_facts)?;
    let output = pipeline.run(&args.modules, &CancellationToken::new())?;
    let report = &output.report;

    println!("{}", reporter.generate(report)?);

    for pending in &output.pending {
        info!(
            rule = %pending.rule_id,
            subject = %pending.key,
            "deferred for judgment"
        );
    }

    if let Some(db) = &db {
        record_report(db, report)?;
        pipeline.events().emit_report_recorded(&ReportRecordedEvent {
            run_id: report.run_id.clone(),
        });
        if retention_days > 0 {
            if let Err(e) = specdrift_storage::retention::apply_retention(db, retention_days) {
                warn!(error = %e, "retention sweep failed");
            }
        }
    }

    if report.p1_count() > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
