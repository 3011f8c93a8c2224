//! Recorded score history for a module.

use std::process::ExitCode;

use specdrift_core::config::CliOverrides;
use specdrift_storage::score_history;

use super::{load_config, open_database, CliResult};

pub struct HistoryArgs {
    pub module: String,
    pub since_days: u32,
    pub format: String,
    pub db: Option<String>,
}

pub fn run(args: HistoryArgs) -> CliResult<ExitCode> {
    let config = load_config(CliOverrides {
        db_path: args.db,
        ..CliOverrides::default()
    })?;
    let db = open_database(&config)?;
    let history = score_history(&db, &args.module, args.since_days)?;

    match args.format.as_str() {
        "json" => {
            let rows: Vec<serde_json::Value> = history
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "run_id": p.run_id,
                        "score": p.score,
                        "recorded_at": p.recorded_at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        "console" | "markdown" => {
            if history.is_empty() {
                println!(
                    "No recorded scores for module '{}' in the last {} days.",
                    args.module, args.since_days
                );
            } else {
                println!("| run id | recorded at | score |");
                println!("|--------|-------------|-------|");
                for point in &history {
                    let score = point
                        .score
                        .map(|s| format!("{:.1}%", s * 100.0))
                        .unwrap_or_else(|| "unavailable".to_string());
                    println!("| {} | {} | {} |", point.run_id, point.recorded_at, score);
                }
            }
        }
        other => return Err(format!("unknown report format '{other}'").into()),
    }

    Ok(ExitCode::SUCCESS)
}
