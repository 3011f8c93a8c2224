//! Console reporter — terse terminal summary with color codes.

use std::fmt::Write;

use specdrift_core::model::{Priority, Report};

use super::Reporter;

/// Console reporter for human-readable terminal output.
pub struct ConsoleReporter;

fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::P1 => "\x1b[31m", // red
        Priority::P2 => "\x1b[33m", // yellow
        Priority::P3 => "\x1b[36m", // cyan
        Priority::P4 => "\x1b[90m", // gray
    }
}

const RESET: &str = "\x1b[0m";

impl Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn generate(&self, report: &Report) -> Result<String, String> {
        let mut out = String::new();
        let w = &mut out;

        let _ = writeln!(
            w,
            "run {} [{}] — {} gaps across {} modules",
            report.run_id,
            report.status.as_str(),
            report.gaps.len(),
            report.modules.len()
        );

        for score in &report.module_scores {
            match score.score {
                Some(s) => {
                    let _ = writeln!(w, "  {} {:.0}%", score.module, s * 100.0);
                }
                None => {
                    let _ = writeln!(w, "  {} (score unavailable)", score.module);
                }
            }
        }

        for gap in &report.gaps {
            let _ = writeln!(
                w,
                "{}{}{} {} {}/{} — {}",
                priority_color(gap.priority),
                gap.priority,
                RESET,
                gap.gap_type,
                gap.module,
                gap.subject,
                gap.description
            );
        }

        if !report.warnings.is_empty() {
            let _ = writeln!(w, "{} warnings (see json/markdown output)", report.warnings.len());
        }

        Ok(out)
    }
}
