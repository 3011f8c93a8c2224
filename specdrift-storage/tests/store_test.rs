//! Trend store integration tests against real database files.

use std::time::{SystemTime, UNIX_EPOCH};

use specdrift_core::errors::StorageError;
use specdrift_core::model::{
    Gap, GapType, ModuleScore, Priority, Report, RunId, RunStatus, RunWarning,
};
use specdrift_storage::retention::apply_retention;
use specdrift_storage::{load_report, recent_run_ids, record_report, score_history, Database};

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn sample_report(run_id: &str, timestamp: i64) -> Report {
    Report {
        run_id: RunId::from_string(run_id.to_string()),
        timestamp,
        spec_revision: "a1b2c3d4e5f60718".to_string(),
        code_revision: "18f6e5d4c3b2a190".to_string(),
        modules: vec!["Accounts".to_string(), "Billing".to_string()],
        gaps: vec![
            Gap {
                gap_type: GapType::MultiTenancyGap,
                priority: Priority::P2,
                module: "Billing".to_string(),
                subject: "Invoice".to_string(),
                description: "Attribute 'tenant_scoped' differs between sources".to_string(),
                decision_options: vec![
                    "Scope the implementation to the tenant".to_string(),
                    "Relax the documented tenancy requirement".to_string(),
                ],
            },
            Gap {
                gap_type: GapType::SpecCodeDelta,
                priority: Priority::P3,
                module: "Accounts".to_string(),
                subject: "User".to_string(),
                description: "Documented but not implemented".to_string(),
                decision_options: vec!["Implement the entity".to_string()],
            },
        ],
        module_scores: vec![
            ModuleScore {
                module: "Accounts".to_string(),
                score: Some(0.5),
                gaps_weighted: 2,
                rules_weighted: 4,
            },
            ModuleScore {
                module: "Billing".to_string(),
                score: Some(0.25),
                gaps_weighted: 6,
                rules_weighted: 8,
            },
        ],
        warnings: vec![RunWarning::Parse {
            document: "billing.md".to_string(),
            line: 12,
            message: "malformed transition table".to_string(),
        }],
        status: RunStatus::Complete,
    }
}

#[test]
fn opening_applies_the_schema() {
    let db = Database::open_in_memory().unwrap();
    let version = db
        .with_writer(specdrift_storage::migrations::schema_version)
        .unwrap();
    assert_eq!(version, 1);
}

#[test]
fn record_then_load_round_trips() {
    let db = Database::open_in_memory().unwrap();
    let report = sample_report("0000000001000-000001", now());

    record_report(&db, &report).unwrap();
    let loaded = load_report(&db, "0000000001000-000001").unwrap();

    assert_eq!(loaded.run_id, report.run_id);
    assert_eq!(loaded.gaps, report.gaps);
    assert_eq!(loaded.module_scores, report.module_scores);
    assert_eq!(loaded.warnings, report.warnings);
    assert_eq!(loaded.status, RunStatus::Complete);
    assert_eq!(loaded.modules, report.modules);
}

#[test]
fn duplicate_run_id_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let report = sample_report("0000000001000-000001", now());

    record_report(&db, &report).unwrap();
    let err = record_report(&db, &report).unwrap_err();
    assert!(matches!(err, StorageError::DuplicateRun { run_id } if run_id == "0000000001000-000001"));

    // The first recording is untouched.
    let loaded = load_report(&db, "0000000001000-000001").unwrap();
    assert_eq!(loaded.gaps.len(), 2);
}

#[test]
fn missing_report_is_a_distinct_error() {
    let db = Database::open_in_memory().unwrap();
    let err = load_report(&db, "0000000009999-000001").unwrap_err();
    assert!(matches!(err, StorageError::ReportNotFound { .. }));
}

#[test]
fn recent_run_ids_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let t = now();
    for seq in 1..=3 {
        let run_id = format!("{:013}-{:06}", 1000 + seq, seq);
        record_report(&db, &sample_report(&run_id, t)).unwrap();
    }

    let ids = recent_run_ids(&db, 2).unwrap();
    assert_eq!(ids, vec!["0000000001003-000003", "0000000001002-000002"]);
}

#[test]
fn score_history_is_oldest_first() {
    let db = Database::open_in_memory().unwrap();
    let t = now();
    record_report(&db, &sample_report("0000000001001-000001", t - 3600)).unwrap();
    record_report(&db, &sample_report("0000000001002-000002", t)).unwrap();

    let history = score_history(&db, "Billing", 7).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].run_id, "0000000001001-000001");
    assert_eq!(history[1].run_id, "0000000001002-000002");
    assert_eq!(history[0].score, Some(0.25));

    assert!(score_history(&db, "Unknown", 7).unwrap().is_empty());
}

#[test]
fn retention_removes_old_reports_but_keeps_newest() {
    let db = Database::open_in_memory().unwrap();
    let t = now();
    record_report(&db, &sample_report("0000000001001-000001", t - 200 * 86400)).unwrap();
    record_report(&db, &sample_report("0000000001002-000002", t)).unwrap();

    let swept = apply_retention(&db, 90).unwrap();
    assert_eq!(swept.reports_deleted, 1);

    assert!(load_report(&db, "0000000001001-000001").is_err());
    assert!(load_report(&db, "0000000001002-000002").is_ok());

    // Cascade removed the old report's score rows.
    let history = score_history(&db, "Billing", 365).unwrap();
    assert_eq!(history.len(), 1);
}

#[test]
fn retention_never_deletes_the_only_report() {
    let db = Database::open_in_memory().unwrap();
    record_report(&db, &sample_report("0000000001001-000001", now() - 400 * 86400)).unwrap();

    let swept = apply_retention(&db, 90).unwrap();
    assert_eq!(swept.reports_deleted, 0);
    assert!(load_report(&db, "0000000001001-000001").is_ok());
}

#[test]
fn reopening_a_file_database_preserves_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trend.db");

    {
        let db = Database::open(&path).unwrap();
        record_report(&db, &sample_report("0000000001001-000001", now())).unwrap();
        db.checkpoint().unwrap();
    }

    let db = Database::open(&path).unwrap();
    let loaded = load_report(&db, "0000000001001-000001").unwrap();
    assert_eq!(loaded.gaps.len(), 2);
}
