//! CLI command handlers.

pub mod config;
pub mod start;

use calgate_config::Settings;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Settings resolved from the environment.
    pub settings: Settings,
    /// Verbose output enabled.
    pub verbose: bool,
}
