//! Subcommand implementations.

pub mod check;
pub mod history;
pub mod watch;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use specdrift_core::config::{CliOverrides, SpecdriftConfig};
use specdrift_engine::adapter::provider::JsonFileProvider;
use specdrift_engine::pipeline::Pipeline;
use specdrift_engine::registry::RuleRegistry;
use specdrift_storage::Database;

pub(crate) type CliResult<T> = Result<T, Box<dyn Error>>;

/// Resolve config for the current directory with CLI overrides applied.
pub(crate) fn load_config(overrides: CliOverrides) -> CliResult<SpecdriftConfig> {
    let cwd = std::env::current_dir()?;
    Ok(SpecdriftConfig::load(&cwd, Some(&overrides))?)
}

/// Built-in rules unless the config names a rule file.
pub(crate) fn load_registry(config: &SpecdriftConfig) -> CliResult<RuleRegistry> {
    match &config.engine.rules_file {
        Some(path) => Ok(RuleRegistry::load_from_file(Path::new(path))?),
        None => Ok(RuleRegistry::builtin()),
    }
}

pub(crate) fn build_pipeline(
    config: SpecdriftConfig,
    code_facts: &Path,
) -> CliResult<Pipeline> {
    let registry = load_registry(&config)?;
    let provider = Arc::new(JsonFileProvider::new(code_facts));
    Ok(Pipeline::new(config, registry, provider)?)
}

pub(crate) fn open_database(config: &SpecdriftConfig) -> CliResult<Database> {
    Ok(Database::open(Path::new(config.storage.effective_db_path()))?)
}
