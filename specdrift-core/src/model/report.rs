//! Reports — immutable run results forming the append-only trend store.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::gap::Gap;

/// Monotonic run identifier: millisecond timestamp plus a per-process
/// counter. Zero-padded so lexicographic order matches generation order,
/// which keeps trend queries stable under out-of-order report writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(String);

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

impl RunId {
    /// Generate the next run id for this process.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let seq = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{millis:013}-{seq:06}"))
    }

    /// Wrap an existing id (reads from the trend store).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    /// Some fact sources were degraded; the report carries warnings.
    Partial,
    /// Cancelled cooperatively. Recorded, never silently dropped.
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial => "partial",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "complete" => Some(Self::Complete),
            "partial" => Some(Self::Partial),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Structured warnings attached to a report. Degradations are recorded
/// here rather than escalated to process failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    Parse {
        document: String,
        line: usize,
        message: String,
    },
    UnrecognizedKind {
        #[serde(rename = "fact_kind")]
        kind: String,
        module: String,
        subject: String,
    },
    ProviderTimeout {
        timeout_ms: u64,
    },
    ModuleFailed {
        module: String,
        message: String,
    },
}

/// Compliance score for one module within one run.
/// `score` is `1 - weighted gaps / weighted rules evaluated`, clamped to
/// [0, 1]; `None` when the module's facts were unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleScore {
    pub module: String,
    pub score: Option<f64>,
    pub gaps_weighted: u32,
    pub rules_weighted: u32,
}

/// One run's immutable result. Totally ordered by `run_id`; the trend
/// store never rewrites a past report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub run_id: RunId,
    /// Unix seconds at run start.
    pub timestamp: i64,
    pub spec_revision: String,
    pub code_revision: String,
    pub modules: Vec<String>,
    pub gaps: Vec<Gap>,
    pub module_scores: Vec<ModuleScore>,
    pub warnings: Vec<RunWarning>,
    pub status: RunStatus,
}

impl Report {
    /// Number of gaps at the highest priority level.
    pub fn p1_count(&self) -> usize {
        self.gaps
            .iter()
            .filter(|g| g.priority == super::gap::Priority::P1)
            .count()
    }
}
