//! Incremental check scheduling.
//!
//! Change signals name a module (and optionally a subject). The
//! scheduler coalesces signal bursts behind a debounce window, claims
//! the dirty module set atomically, and runs one scoped check over
//! exactly that set. Signals arriving while a check is in flight are
//! queued and re-mark their modules Dirty, so the next cycle picks
//! them up. Shutdown is cooperative through the cancellation token;
//! dropping all senders also drains and stops the loop.

pub mod state;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use specdrift_core::errors::ScheduleError;
use specdrift_core::traits::Cancellable;
use tracing::{debug, warn};

use crate::pipeline::{Pipeline, RunOutput};

pub use state::{ModuleState, StateTable};

/// A sustained signal stream may never leave a full debounce window
/// quiet. After this many windows of continuous coalescing the pending
/// dirty set is checked anyway.
const MAX_COALESCE_WINDOWS: u32 = 8;

/// A change notification from the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSignal {
    pub module: String,
    pub subject: Option<String>,
}

impl ChangeSignal {
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            subject: None,
        }
    }
}

/// Receives the output of each scheduled check.
pub trait RunSink: Send + Sync {
    fn accept(&self, output: &RunOutput);
}

/// Debounced, per-module incremental scheduler. Owns the state table;
/// the pipeline is shared so ad-hoc full runs stay possible alongside.
pub struct Scheduler {
    pipeline: Arc<Pipeline>,
    table: StateTable,
    debounce: Duration,
}

impl Scheduler {
    pub fn new(pipeline: Arc<Pipeline>, debounce: Duration) -> Self {
        Self {
            pipeline,
            table: StateTable::new(),
            debounce,
        }
    }

    pub fn table(&self) -> &StateTable {
        &self.table
    }

    /// Block on the signal channel until cancelled or all senders drop.
    /// Each quiet period after a signal burst triggers one scoped check
    /// of the accumulated dirty set.
    pub fn run_loop(
        &self,
        signals: &Receiver<ChangeSignal>,
        sink: &dyn RunSink,
        cancel: &dyn Cancellable,
    ) -> Result<(), ScheduleError> {
        loop {
            if cancel.is_cancelled() {
                debug!("scheduler cancelled, stopping");
                return Ok(());
            }
            match signals.recv_timeout(self.debounce) {
                Ok(signal) => {
                    self.table.mark_dirty(&signal.module);
                    // Keep absorbing until the channel goes quiet for a
                    // full debounce window, or the coalescing deadline
                    // passes.
                    let flush_by =
                        Instant::now() + self.debounce.saturating_mul(MAX_COALESCE_WINDOWS);
                    loop {
                        let remaining = flush_by.saturating_duration_since(Instant::now());
                        if remaining.is_zero() {
                            debug!("coalescing deadline reached, flushing dirty set");
                            break;
                        }
                        match signals.recv_timeout(self.debounce.min(remaining)) {
                            Ok(signal) => {
                                self.table.mark_dirty(&signal.module);
                            }
                            Err(RecvTimeoutError::Timeout) => break,
                            Err(RecvTimeoutError::Disconnected) => {
                                self.check_dirty(sink, cancel)?;
                                return Ok(());
                            }
                        }
                    }
                    self.check_dirty(sink, cancel)?;
                }
                Err(RecvTimeoutError::Timeout) => {
                    // A check that overlapped a signal leaves modules
                    // Dirty again; sweep them up on the next quiet tick.
                    if self.table.has_dirty() {
                        self.check_dirty(sink, cancel)?;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.check_dirty(sink, cancel)?;
                    return Ok(());
                }
            }
        }
    }

    /// Claim the dirty set and run one scoped check over it.
    fn check_dirty(
        &self,
        sink: &dyn RunSink,
        cancel: &dyn Cancellable,
    ) -> Result<(), ScheduleError> {
        let claimed = self.table.begin_check();
        if claimed.is_empty() {
            return Ok(());
        }
        debug!(modules = ?claimed, "running scoped check");

        let result = self.pipeline.run(&claimed, cancel);
        for module in &claimed {
            self.table.finish_check(module)?;
        }
        match result {
            Ok(output) => sink.accept(&output),
            Err(e) => warn!(error = %e, "scoped check failed"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use specdrift_core::config::SpecdriftConfig;
    use specdrift_core::errors::ProviderError;
    use specdrift_core::traits::CancellationToken;

    use crate::adapter::provider::CodeFactProvider;
    use crate::adapter::RawCodeFact;
    use crate::registry::RuleRegistry;

    struct EmptyProvider;

    impl CodeFactProvider for EmptyProvider {
        fn fetch(&self, _modules: &[String]) -> Result<Vec<RawCodeFact>, ProviderError> {
            Ok(Vec::new())
        }
    }

    struct CollectingSink {
        runs: Mutex<Vec<Vec<String>>>,
    }

    impl RunSink for CollectingSink {
        fn accept(&self, output: &RunOutput) {
            self.runs
                .lock()
                .unwrap()
                .push(output.report.modules.clone());
        }
    }

    fn scheduler_with_corpus(debounce_ms: u64) -> (Scheduler, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("billing.md"),
            "## Entity: Invoice\nmodule: Billing\n- persisted: true\n",
        )
        .unwrap();
        let mut config = SpecdriftConfig::default();
        config.extract.corpus_dir = Some(dir.path().to_string_lossy().into_owned());
        let pipeline =
            Pipeline::new(config, RuleRegistry::builtin(), Arc::new(EmptyProvider)).unwrap();
        (
            Scheduler::new(Arc::new(pipeline), Duration::from_millis(debounce_ms)),
            dir,
        )
    }

    #[test]
    fn burst_of_signals_triggers_one_check() {
        let (scheduler, _dir) = scheduler_with_corpus(30);
        let (tx, rx) = crossbeam_channel::unbounded();
        let sink = CollectingSink {
            runs: Mutex::new(Vec::new()),
        };
        let cancel = CancellationToken::new();

        tx.send(ChangeSignal::module("Billing")).unwrap();
        tx.send(ChangeSignal::module("Billing")).unwrap();
        tx.send(ChangeSignal::module("Billing")).unwrap();
        drop(tx);

        scheduler.run_loop(&rx, &sink, &cancel).unwrap();

        let runs = sink.runs.lock().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0], vec!["Billing".to_string()]);
    }

    #[test]
    fn signals_for_two_modules_share_one_scoped_check() {
        let (scheduler, _dir) = scheduler_with_corpus(30);
        let (tx, rx) = crossbeam_channel::unbounded();
        let sink = CollectingSink {
            runs: Mutex::new(Vec::new()),
        };
        let cancel = CancellationToken::new();

        tx.send(ChangeSignal::module("Billing")).unwrap();
        tx.send(ChangeSignal::module("Accounts")).unwrap();
        drop(tx);

        scheduler.run_loop(&rx, &sink, &cancel).unwrap();

        let runs = sink.runs.lock().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(
            runs[0],
            vec!["Accounts".to_string(), "Billing".to_string()]
        );
    }

    #[test]
    fn sustained_signal_stream_still_gets_checked() {
        let (scheduler, _dir) = scheduler_with_corpus(20);
        let (tx, rx) = crossbeam_channel::unbounded();
        let sink = CollectingSink {
            runs: Mutex::new(Vec::new()),
        };
        let cancel = CancellationToken::new();

        // Signals arrive faster than the debounce window for well past
        // the coalescing deadline. The first check must land before the
        // stream stops.
        let feeder = std::thread::spawn(move || {
            for _ in 0..80 {
                if tx.send(ChangeSignal::module("Billing")).is_err() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        });

        scheduler.run_loop(&rx, &sink, &cancel).unwrap();
        feeder.join().unwrap();

        let runs = sink.runs.lock().unwrap();
        assert!(
            runs.len() >= 2,
            "expected a mid-stream flush plus the final drain, got {}",
            runs.len()
        );
        for run in runs.iter() {
            assert_eq!(run, &vec!["Billing".to_string()]);
        }
    }

    #[test]
    fn cancelled_scheduler_stops_without_checking() {
        let (scheduler, _dir) = scheduler_with_corpus(10);
        let (tx, rx) = crossbeam_channel::unbounded::<ChangeSignal>();
        let sink = CollectingSink {
            runs: Mutex::new(Vec::new()),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        scheduler.run_loop(&rx, &sink, &cancel).unwrap();
        drop(tx);
        assert!(sink.runs.lock().unwrap().is_empty());
    }
}
