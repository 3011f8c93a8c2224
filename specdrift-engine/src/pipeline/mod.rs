//! The run pipeline — extract, fetch, evaluate, classify, score.
//!
//! Fact retrieval happens once, before evaluation, and is the only
//! suspension point that depends on an external system. Everything
//! after it is a pure function of the fetched fact sets, so a run is
//! reproducible from its inputs. Module failures are isolated: a module
//! with no facts at all fails alone while the others complete.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use specdrift_core::config::SpecdriftConfig;
use specdrift_core::errors::{ConfigError, PipelineError};
use specdrift_core::events::{
    EventDispatcher, GapDetectedEvent, JudgmentDeferredEvent, ModuleCheckCompleteEvent,
    ModuleCheckStartedEvent, ProviderDegradedEvent, RunCompleteEvent, RunStartedEvent,
};
use specdrift_core::model::{
    CodeFact, Gap, ModuleScore, PendingJudgment, Report, RunId, RunStatus, RunWarning, SpecFact,
};
use specdrift_core::traits::Cancellable;
use specdrift_core::types::collections::{FxHashMap, FxHashSet};
use xxhash_rust::xxh3::Xxh3;

use crate::adapter::provider::{fetch_bounded, CodeFactProvider};
use crate::adapter;
use crate::classify;
use crate::extract::{self, Corpus};
use crate::registry::RuleRegistry;
use crate::rules;

/// Everything a single run produces. The report is the persisted part;
/// pending judgments are forwarded to the judgment sink, never awaited.
#[derive(Debug)]
pub struct RunOutput {
    pub report: Report,
    pub pending: Vec<PendingJudgment>,
}

/// The compliance pipeline, wired once and reused across runs.
/// The registry is read-only during evaluation; swap in a new pipeline
/// (or a reloaded registry) between runs, never mid-run.
pub struct Pipeline {
    config: SpecdriftConfig,
    registry: RuleRegistry,
    provider: Arc<dyn CodeFactProvider>,
    events: EventDispatcher,
    pool: rayon::ThreadPool,
}

impl Pipeline {
    /// Builds the bounded worker pool sized by `engine.workers`.
    pub fn new(
        config: SpecdriftConfig,
        registry: RuleRegistry,
        provider: Arc<dyn CodeFactProvider>,
    ) -> Result<Self, ConfigError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.engine.effective_workers())
            .thread_name(|i| format!("specdrift-worker-{i}"))
            .build()
            .map_err(|e| ConfigError::ValidationFailed {
                field: "engine.workers".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            config,
            registry,
            provider,
            events: EventDispatcher::new(),
            pool,
        })
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Run the pipeline over `scope` modules (empty scope means all),
    /// reading the corpus from the configured directory.
    pub fn run(
        &self,
        scope: &[String],
        cancel: &dyn Cancellable,
    ) -> Result<RunOutput, PipelineError> {
        let corpus = Corpus::read_dir(
            std::path::Path::new(self.config.extract.effective_corpus_dir()),
            &self.config.extract.effective_extensions(),
        )?;
        self.run_with_corpus(&corpus, scope, cancel)
    }

    /// Run with an already loaded corpus (used by the scheduler and by
    /// tests to avoid filesystem coupling).
    pub fn run_with_corpus(
        &self,
        corpus: &Corpus,
        scope: &[String],
        cancel: &dyn Cancellable,
    ) -> Result<RunOutput, PipelineError> {
        let run_id = RunId::generate();
        let started = Instant::now();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let mut warnings = Vec::new();

        // Extract spec facts (best-effort, warnings collected).
        let (spec_facts, parse_warnings) = extract::extract(corpus);
        warnings.extend(parse_warnings);
        let spec_facts: Vec<SpecFact> = scoped(spec_facts, scope, |f| &f.key.module);

        // Fetch code facts — the one time-bounded external call.
        let timeout = Duration::from_millis(self.config.engine.effective_provider_timeout_ms());
        let outcome = fetch_bounded(self.provider.clone(), scope, timeout)?;
        if let Some(warning) = outcome.warning {
            if let RunWarning::ProviderTimeout { timeout_ms } = warning {
                self.events.emit_provider_degraded(&ProviderDegradedEvent {
                    run_id: run_id.clone(),
                    timeout_ms,
                });
            }
            warnings.push(warning);
        }
        let (code_facts, adapter_warnings) = adapter::normalize(outcome.records);
        warnings.extend(adapter_warnings);
        let code_facts: Vec<CodeFact> = scoped(code_facts, scope, |f| &f.key.module);

        let code_revision = code_revision(&code_facts);
        let modules = module_set(&spec_facts, &code_facts, scope);

        self.events.emit_run_started(&RunStartedEvent {
            run_id: run_id.clone(),
            modules: modules.clone(),
        });

        // Explicitly scoped modules with no facts on either side fail
        // alone; the rest of the run continues.
        let mut failed_modules: FxHashSet<String> = FxHashSet::default();
        for module in scope {
            let has_facts = spec_facts.iter().any(|f| &f.key.module == module)
                || code_facts.iter().any(|f| &f.key.module == module);
            if !has_facts {
                warnings.push(RunWarning::ModuleFailed {
                    module: module.clone(),
                    message: "no facts available from either source".to_string(),
                });
                failed_modules.insert(module.clone());
            }
        }

        // Fan modules out over the bounded worker pool (pair fan-out
        // inside `evaluate` shares the same pool), then join results in
        // module order so parallelism never changes the output.
        let outcomes: Vec<Option<ModuleOutcome>> = self.pool.install(|| {
            modules
                .par_iter()
                .map(|module| {
                    self.check_module(
                        module,
                        &run_id,
                        &spec_facts,
                        &code_facts,
                        &failed_modules,
                        cancel,
                    )
                })
                .collect()
        });

        let mut gaps: Vec<Gap> = Vec::new();
        let mut pending = Vec::new();
        let mut module_scores = Vec::new();
        let mut cancelled = false;
        for outcome in outcomes {
            match outcome {
                Some(outcome) => {
                    gaps.extend(outcome.gaps);
                    pending.extend(outcome.pending);
                    module_scores.push(outcome.score);
                }
                None => cancelled = true,
            }
        }

        // Re-apply the global gap ordering across modules.
        gaps.sort_by(|a, b| {
            (a.priority, &a.module, &a.subject).cmp(&(b.priority, &b.module, &b.subject))
        });

        let status = if cancelled {
            RunStatus::Cancelled
        } else if warnings
            .iter()
            .any(|w| matches!(w, RunWarning::ProviderTimeout { .. } | RunWarning::ModuleFailed { .. }))
        {
            RunStatus::Partial
        } else {
            RunStatus::Complete
        };

        let report = Report {
            run_id: run_id.clone(),
            timestamp,
            spec_revision: corpus.revision(),
            code_revision,
            modules,
            gaps,
            module_scores,
            warnings,
            status,
        };

        self.events.emit_run_complete(&RunCompleteEvent {
            run_id,
            status,
            gap_count: report.gaps.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        });

        Ok(RunOutput { report, pending })
    }

    /// Check one module: evaluate, classify, score, emit its events.
    /// Returns `None` when cancellation was observed first.
    fn check_module(
        &self,
        module: &str,
        run_id: &RunId,
        spec_facts: &[SpecFact],
        code_facts: &[CodeFact],
        failed_modules: &FxHashSet<String>,
        cancel: &dyn Cancellable,
    ) -> Option<ModuleOutcome> {
        if failed_modules.contains(module) {
            return Some(ModuleOutcome {
                gaps: Vec::new(),
                pending: Vec::new(),
                score: ModuleScore {
                    module: module.to_string(),
                    score: None,
                    gaps_weighted: 0,
                    rules_weighted: 0,
                },
            });
        }
        if cancel.is_cancelled() {
            return None;
        }

        self.events.emit_module_check_started(&ModuleCheckStartedEvent {
            run_id: run_id.clone(),
            module: module.to_string(),
        });

        let module_scope = [module.to_string()];
        let output = rules::evaluate(spec_facts, code_facts, &self.registry, &module_scope, cancel);
        if output.cancelled {
            return None;
        }

        let gaps = classify::classify(&output.findings, &self.registry, spec_facts);
        for gap in &gaps {
            self.events.emit_gap_detected(&GapDetectedEvent {
                run_id: run_id.clone(),
                gap_type: gap.gap_type,
                priority: gap.priority,
                module: gap.module.clone(),
                subject: gap.subject.clone(),
            });
        }
        for deferral in &output.pending {
            self.events.emit_judgment_deferred(&JudgmentDeferredEvent {
                run_id: run_id.clone(),
                rule_id: deferral.rule_id.clone(),
                module: deferral.key.module.clone(),
                subject: deferral.key.subject.clone(),
            });
        }
        let score = self.score_module(module, &output.findings, &gaps);

        self.events.emit_module_check_complete(&ModuleCheckCompleteEvent {
            run_id: run_id.clone(),
            module: module.to_string(),
            gap_count: gaps.len(),
            score: score.score,
        });

        Some(ModuleOutcome {
            gaps,
            pending: output.pending,
            score,
        })
    }

    /// Module score: `1 - weighted gaps / weighted rules evaluated`,
    /// clamped to [0, 1]. A module with nothing evaluated scores 1.0.
    fn score_module(
        &self,
        module: &str,
        findings: &[specdrift_core::model::Finding],
        gaps: &[Gap],
    ) -> ModuleScore {
        let rule_priorities: FxHashMap<&str, _> = self
            .registry
            .rules()
            .iter()
            .map(|r| (r.id.as_str(), r.default_priority))
            .collect();

        let rules_weighted: u32 = findings
            .iter()
            .filter(|f| f.key.module == module)
            .filter_map(|f| rule_priorities.get(f.rule_id.as_str()))
            .map(|p| p.weight())
            .sum();
        let gaps_weighted: u32 = gaps
            .iter()
            .filter(|g| g.module == module)
            .map(|g| g.priority.weight())
            .sum();

        let score = if rules_weighted == 0 {
            1.0
        } else {
            (1.0 - f64::from(gaps_weighted) / f64::from(rules_weighted)).clamp(0.0, 1.0)
        };

        ModuleScore {
            module: module.to_string(),
            score: Some(score),
            gaps_weighted,
            rules_weighted,
        }
    }
}

/// One module's contribution to the run, joined in module order.
struct ModuleOutcome {
    gaps: Vec<Gap>,
    pending: Vec<PendingJudgment>,
    score: ModuleScore,
}

fn scoped<T>(facts: Vec<T>, scope: &[String], module_of: impl Fn(&T) -> &String) -> Vec<T> {
    if scope.is_empty() {
        return facts;
    }
    facts
        .into_iter()
        .filter(|f| scope.contains(module_of(f)))
        .collect()
}

/// Sorted union of modules seen on either side, plus everything the
/// caller explicitly asked for (so empty modules still get a score row).
fn module_set(spec_facts: &[SpecFact], code_facts: &[CodeFact], scope: &[String]) -> Vec<String> {
    let mut modules: Vec<String> = spec_facts
        .iter()
        .map(|f| f.key.module.clone())
        .chain(code_facts.iter().map(|f| f.key.module.clone()))
        .chain(scope.iter().cloned())
        .collect();
    modules.sort();
    modules.dedup();
    modules
}

/// Fingerprint of the normalized code fact snapshot.
fn code_revision(code_facts: &[CodeFact]) -> String {
    let mut hasher = Xxh3::new();
    for fact in code_facts {
        hasher.update(fact.key.to_string().as_bytes());
        for (attr, value) in &fact.attributes {
            hasher.update(attr.as_bytes());
            hasher.update(format!("{value:?}").as_bytes());
        }
    }
    format!("{:016x}", hasher.digest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::RawCodeFact;
    use specdrift_core::errors::ProviderError;
    use specdrift_core::model::{GapType, Priority};
    use specdrift_core::traits::CancellationToken;

    struct StaticProvider(Vec<RawCodeFact>);

    impl CodeFactProvider for StaticProvider {
        fn fetch(&self, _modules: &[String]) -> Result<Vec<RawCodeFact>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    fn raw(module: &str, kind: &str, subject: &str, attrs: &[(&str, serde_json::Value)]) -> RawCodeFact {
        let mut attributes = serde_json::Map::new();
        for (name, value) in attrs {
            attributes.insert((*name).to_string(), value.clone());
        }
        RawCodeFact {
            module: module.to_string(),
            kind: kind.to_string(),
            subject: subject.to_string(),
            attributes,
            provenance: "src/billing.rs".to_string(),
        }
    }

    fn billing_corpus() -> Corpus {
        Corpus::from_documents(vec![(
            "billing.md".to_string(),
            "## Entity: Invoice\nmodule: Billing\n@tenant-scoped\n- persisted: true\n".to_string(),
        )])
    }

    fn billing_pipeline() -> Pipeline {
        let provider = StaticProvider(vec![
            raw(
                "Billing",
                "entity_def",
                "Invoice",
                &[
                    ("tenant_scoped", serde_json::Value::Bool(false)),
                    ("persisted", serde_json::Value::Bool(true)),
                ],
            ),
            raw(
                "Billing",
                "tenancy_rule",
                "Invoice",
                &[("tenant_scoped", serde_json::Value::Bool(false))],
            ),
        ]);
        Pipeline::new(
            SpecdriftConfig::default(),
            RuleRegistry::builtin(),
            Arc::new(provider),
        )
        .unwrap()
    }

    #[test]
    fn tenancy_mismatch_produces_escalated_gap() {
        let pipeline = billing_pipeline();
        let output = pipeline
            .run_with_corpus(&billing_corpus(), &[], &CancellationToken::new())
            .unwrap();

        let report = &output.report;
        assert_eq!(report.status, RunStatus::Complete);
        assert_eq!(report.modules, vec!["Billing".to_string()]);
        assert_eq!(report.gaps.len(), 2);

        // The escalated tenant-isolation gap sorts first.
        let top = &report.gaps[0];
        assert_eq!(top.gap_type, GapType::MultiTenancyGap);
        assert_eq!(top.priority, Priority::P2);
        assert_eq!(top.subject, "Invoice");

        // entity-implemented satisfied (4) + two tenancy rules (2 + 2),
        // gaps weigh 4 + 2 after escalation.
        let score = &report.module_scores[0];
        assert_eq!(score.rules_weighted, 8);
        assert_eq!(score.gaps_weighted, 6);
        assert_eq!(score.score, Some(0.25));
    }

    #[test]
    fn repeated_runs_are_identical_apart_from_identity() {
        let pipeline = billing_pipeline();
        let corpus = billing_corpus();
        let first = pipeline
            .run_with_corpus(&corpus, &[], &CancellationToken::new())
            .unwrap();
        let second = pipeline
            .run_with_corpus(&corpus, &[], &CancellationToken::new())
            .unwrap();

        assert_eq!(first.report.gaps, second.report.gaps);
        assert_eq!(first.report.module_scores, second.report.module_scores);
        assert_eq!(first.report.spec_revision, second.report.spec_revision);
        assert_eq!(first.report.code_revision, second.report.code_revision);
        assert_eq!(first.report.warnings, second.report.warnings);
        assert!(first.report.run_id < second.report.run_id);
    }

    #[test]
    fn scoped_module_without_facts_fails_alone() {
        let pipeline = billing_pipeline();
        let scope = vec!["Billing".to_string(), "Ghost".to_string()];
        let output = pipeline
            .run_with_corpus(&billing_corpus(), &scope, &CancellationToken::new())
            .unwrap();

        let report = &output.report;
        assert_eq!(report.status, RunStatus::Partial);
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, RunWarning::ModuleFailed { module, .. } if module == "Ghost")));

        let ghost = report
            .module_scores
            .iter()
            .find(|s| s.module == "Ghost")
            .unwrap();
        assert_eq!(ghost.score, None);
        let billing = report
            .module_scores
            .iter()
            .find(|s| s.module == "Billing")
            .unwrap();
        assert!(billing.score.is_some());
    }

    #[test]
    fn worker_pool_size_does_not_change_output() {
        let provider = || {
            StaticProvider(vec![raw(
                "Billing",
                "entity_def",
                "Invoice",
                &[("persisted", serde_json::Value::Bool(true))],
            )])
        };
        let corpus = Corpus::from_documents(vec![
            (
                "billing.md".to_string(),
                "## Entity: Invoice\nmodule: Billing\n- persisted: true\n".to_string(),
            ),
            (
                "accounts.md".to_string(),
                "## Entity: User\nmodule: Accounts\n- persisted: true\n".to_string(),
            ),
        ]);

        let pipeline_with = |workers: usize| {
            let mut config = SpecdriftConfig::default();
            config.engine.workers = Some(workers);
            Pipeline::new(config, RuleRegistry::builtin(), Arc::new(provider())).unwrap()
        };

        let serial = pipeline_with(1)
            .run_with_corpus(&corpus, &[], &CancellationToken::new())
            .unwrap();
        let parallel = pipeline_with(4)
            .run_with_corpus(&corpus, &[], &CancellationToken::new())
            .unwrap();

        assert_eq!(serial.report.modules, parallel.report.modules);
        assert_eq!(serial.report.gaps, parallel.report.gaps);
        assert_eq!(serial.report.module_scores, parallel.report.module_scores);
    }

    #[test]
    fn cancellation_yields_cancelled_status() {
        let pipeline = billing_pipeline();
        let token = CancellationToken::new();
        token.cancel();
        let output = pipeline
            .run_with_corpus(&billing_corpus(), &[], &token)
            .unwrap();
        assert_eq!(output.report.status, RunStatus::Cancelled);
        assert!(output.report.gaps.is_empty());
    }
}
