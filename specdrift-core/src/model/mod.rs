//! The fact model — shared data structures for specification facts,
//! code facts, rules, findings, gaps, and reports.
//!
//! Nothing here is mutated after creation: spec facts are rebuilt on each
//! corpus read, code facts on each provider call, and findings, gaps, and
//! reports are created per run. Concurrent evaluation relies on this.

pub mod fact;
pub mod finding;
pub mod gap;
pub mod report;
pub mod rule;

pub use fact::{AttrValue, CodeFact, FactKey, FactKind, SourceLocation, SpecFact};
pub use finding::{Evidence, Finding, PendingJudgment};
pub use gap::{Gap, GapType, Priority};
pub use report::{ModuleScore, Report, RunId, RunStatus, RunWarning};
pub use rule::{DecisionNode, LeafOutcome, NodeRef, Predicate, Rule, Side};
