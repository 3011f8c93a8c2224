//! specdrift-storage — the append-only trend store.
//!
//! Every completed run is recorded as an immutable report row plus its
//! gaps, module scores, and warnings. History is never rewritten; the
//! retention sweep is the only thing that deletes, and it always keeps
//! the newest report per module untouched. One serialized write
//! connection, a small pool of read-only connections.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod retention;

pub use connection::Database;
pub use queries::reports::{load_report, record_report, recent_run_ids};
pub use queries::scores::{score_history, ScorePoint};
