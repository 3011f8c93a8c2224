//! Reporters — output formats for run reports.

pub mod console;
pub mod json;
pub mod markdown;

use specdrift_core::model::Report;

/// Trait for report generation.
pub trait Reporter: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate(&self, report: &Report) -> Result<String, String>;
}

/// Create a reporter by format name.
pub fn create_reporter(format: &str) -> Option<Box<dyn Reporter>> {
    match format {
        "json" => Some(Box::new(json::JsonReporter)),
        "markdown" => Some(Box::new(markdown::MarkdownReporter)),
        "console" => Some(Box::new(console::ConsoleReporter)),
        _ => None,
    }
}

/// List all available reporter format names.
pub fn available_formats() -> &'static [&'static str] {
    &["json", "markdown", "console"]
}
