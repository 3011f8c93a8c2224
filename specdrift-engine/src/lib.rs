//! specdrift-engine — the deterministic compliance pipeline.
//!
//! Spec fact extraction, code fact adaptation, rule evaluation over XOR
//! decision trees, gap classification, report rendering, and the
//! incremental per-module scheduler. Fact retrieval is the only external
//! suspension point; everything downstream is a pure function of the
//! fetched fact sets and the loaded rule registry.

pub mod adapter;
pub mod classify;
pub mod extract;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod rules;
pub mod schedule;
