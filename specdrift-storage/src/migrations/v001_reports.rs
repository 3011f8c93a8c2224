//! V001: Report history schema.
//! reports, report_gaps, module_scores, report_warnings.

pub const MIGRATION_SQL: &str = r#"
-- One row per run, append-only. The run id is generated monotonically
-- so lexicographic order is recording order.
CREATE TABLE IF NOT EXISTS reports (
    run_id TEXT PRIMARY KEY,
    recorded_at INTEGER NOT NULL,
    spec_revision TEXT NOT NULL,
    code_revision TEXT NOT NULL,
    status TEXT NOT NULL,
    gap_count INTEGER NOT NULL,
    p1_count INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_reports_recorded
    ON reports(recorded_at);

-- Gaps keep their in-report position so the stored ordering is exactly
-- the report ordering.
CREATE TABLE IF NOT EXISTS report_gaps (
    run_id TEXT NOT NULL REFERENCES reports(run_id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    gap_type TEXT NOT NULL,
    priority TEXT NOT NULL,
    module TEXT NOT NULL,
    subject TEXT NOT NULL,
    description TEXT NOT NULL,
    decision_options TEXT NOT NULL,
    PRIMARY KEY (run_id, position)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_report_gaps_module
    ON report_gaps(module);

-- Per-module scores per run; score is NULL for failed modules.
CREATE TABLE IF NOT EXISTS module_scores (
    run_id TEXT NOT NULL REFERENCES reports(run_id) ON DELETE CASCADE,
    module TEXT NOT NULL,
    score REAL,
    gaps_weighted INTEGER NOT NULL,
    rules_weighted INTEGER NOT NULL,
    recorded_at INTEGER NOT NULL,
    PRIMARY KEY (run_id, module)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_module_scores_trend
    ON module_scores(module, recorded_at);

-- Run warnings as serialized payloads, position-ordered.
CREATE TABLE IF NOT EXISTS report_warnings (
    run_id TEXT NOT NULL REFERENCES reports(run_id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    payload TEXT NOT NULL,
    PRIMARY KEY (run_id, position)
) STRICT;
"#;
