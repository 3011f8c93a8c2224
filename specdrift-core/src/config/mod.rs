//! Configuration system for Specdrift.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod engine_config;
pub mod extract_config;
pub mod schedule_config;
pub mod specdrift_config;
pub mod storage_config;

pub use engine_config::EngineConfig;
pub use extract_config::ExtractConfig;
pub use schedule_config::ScheduleConfig;
pub use specdrift_config::{CliOverrides, SpecdriftConfig};
pub use storage_config::StorageConfig;
