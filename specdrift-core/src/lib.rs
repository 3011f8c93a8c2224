//! specdrift-core — shared types for the Specdrift compliance engine.
//!
//! Fact model, rule model, per-subsystem errors, layered configuration,
//! synchronous events, and cooperative cancellation. No I/O beyond
//! config file reads.

pub mod config;
pub mod errors;
pub mod events;
pub mod model;
pub mod traits;
pub mod types;
