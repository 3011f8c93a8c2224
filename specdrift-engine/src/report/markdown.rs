//! Markdown reporter — gaps grouped by module, warnings and scores
//! listed so a reader sees exactly what was degraded.

use std::fmt::Write;

use specdrift_core::model::{Report, RunWarning};

use super::Reporter;

/// Markdown reporter for human review and diffable artifacts.
pub struct MarkdownReporter;

impl Reporter for MarkdownReporter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn generate(&self, report: &Report) -> Result<String, String> {
        let mut out = String::new();
        let w = &mut out;

        let _ = writeln!(w, "# Compliance Report {}", report.run_id);
        let _ = writeln!(w);
        let _ = writeln!(w, "- Status: {}", report.status.as_str());
        let _ = writeln!(w, "- Spec revision: `{}`", report.spec_revision);
        let _ = writeln!(w, "- Code revision: `{}`", report.code_revision);
        let _ = writeln!(w, "- Modules checked: {}", report.modules.join(", "));
        let _ = writeln!(w, "- Gaps: {} ({} P1)", report.gaps.len(), report.p1_count());
        let _ = writeln!(w);

        let _ = writeln!(w, "## Module scores");
        let _ = writeln!(w);
        let _ = writeln!(w, "| Module | Score | Weighted gaps | Weighted rules |");
        let _ = writeln!(w, "|--------|-------|---------------|----------------|");
        for score in &report.module_scores {
            let rendered = match score.score {
                Some(s) => format!("{s:.2}"),
                None => "unavailable".to_string(),
            };
            let _ = writeln!(
                w,
                "| {} | {} | {} | {} |",
                score.module, rendered, score.gaps_weighted, score.rules_weighted
            );
        }
        let _ = writeln!(w);

        if !report.gaps.is_empty() {
            let _ = writeln!(w, "## Gaps");
            // Gaps arrive pre-sorted (priority, module, subject); group
            // by module without re-sorting to keep output diffable.
            let mut current_module: Option<&str> = None;
            for gap in &report.gaps {
                if current_module != Some(gap.module.as_str()) {
                    current_module = Some(gap.module.as_str());
                    let _ = writeln!(w);
                    let _ = writeln!(w, "### {}", gap.module);
                    let _ = writeln!(w);
                }
                let _ = writeln!(
                    w,
                    "- **{}** [{}] `{}` — {}",
                    gap.priority, gap.gap_type, gap.subject, gap.description
                );
                for option in &gap.decision_options {
                    let _ = writeln!(w, "  - option: {option}");
                }
            }
            let _ = writeln!(w);
        }

        if !report.warnings.is_empty() {
            let _ = writeln!(w, "## Warnings");
            let _ = writeln!(w);
            for warning in &report.warnings {
                let _ = writeln!(w, "- {}", describe_warning(warning));
            }
        }

        Ok(out)
    }
}

fn describe_warning(warning: &RunWarning) -> String {
    match warning {
        RunWarning::Parse {
            document,
            line,
            message,
        } => format!("parse: {document}:{line}: {message}"),
        RunWarning::UnrecognizedKind {
            kind,
            module,
            subject,
        } => format!("unrecognized fact kind '{kind}' for {module}/{subject} (dropped)"),
        RunWarning::ProviderTimeout { timeout_ms } => {
            format!("code-fact provider timed out after {timeout_ms}ms; partial data")
        }
        RunWarning::ModuleFailed { module, message } => {
            format!("module '{module}' failed: {message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use specdrift_core::model::{
        Gap, GapType, ModuleScore, Priority, Report, RunId, RunStatus,
    };

    use super::*;

    #[test]
    fn warnings_and_scores_always_render() {
        let report = Report {
            run_id: RunId::generate(),
            timestamp: 0,
            spec_revision: "aaaa".to_string(),
            code_revision: "bbbb".to_string(),
            modules: vec!["Billing".to_string()],
            gaps: vec![Gap {
                gap_type: GapType::MultiTenancyGap,
                priority: Priority::P2,
                module: "Billing".to_string(),
                subject: "Invoice".to_string(),
                description: "tenancy mismatch".to_string(),
                decision_options: vec!["update the code".to_string()],
            }],
            module_scores: vec![ModuleScore {
                module: "Billing".to_string(),
                score: None,
                gaps_weighted: 0,
                rules_weighted: 0,
            }],
            warnings: vec![RunWarning::ProviderTimeout { timeout_ms: 5000 }],
            status: RunStatus::Partial,
        };

        let out = MarkdownReporter.generate(&report).unwrap();
        assert!(out.contains("### Billing"));
        assert!(out.contains("unavailable"));
        assert!(out.contains("timed out after 5000ms"));
        assert!(out.contains("Multi-Tenancy Gap"));
    }
}
