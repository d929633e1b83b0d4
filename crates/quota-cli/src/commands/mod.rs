//! CLI command implementations

pub mod filter;
pub mod members;

use crate::OutputFormat;
use quota_core::QuotaConfig;

/// Context passed to all commands
pub struct CommandContext {
    pub config: QuotaConfig,
    pub output_format: OutputFormat,
}

impl CommandContext {
    /// Check if output should be JSON
    pub fn is_json(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }
}
