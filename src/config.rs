//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for the reporter, supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults
//! - Builder pattern for programmatic configuration
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SCREENPLAY_REPORT_DIR` | Base directory for report sessions | `/tmp/screenplay-reports` |
//! | `SCREENPLAY_RUNNER_NAME` | Runner name announced in `TestRunnerDetected` | `libtest` |
//! | `SCREENPLAY_CONSOLE` | Log scene progress to the console (`true`/`false`) | `true` |
//! | `SCREENPLAY_LOG` | `tracing` filter directives for the binary | `info` |
//!
//! # Example
//!
//! ```bash
//! export SCREENPLAY_REPORT_DIR="/var/tmp/screenplay"
//! export SCREENPLAY_LOG="screenplay_reporter=debug"
//! cargo test -- -Z unstable-options --format json | screenplay-reporter bridge
//! ```

use once_cell::sync::OnceCell;
use std::env;

// ============================================================================
// Default Values
// ============================================================================

/// Default base directory for report sessions
pub const DEFAULT_REPORT_DIR: &str = "/tmp/screenplay-reports";

/// Default runner name
pub const DEFAULT_RUNNER_NAME: &str = "libtest";

/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the report base directory
pub const ENV_REPORT_DIR: &str = "SCREENPLAY_REPORT_DIR";

/// Environment variable for the runner name
pub const ENV_RUNNER_NAME: &str = "SCREENPLAY_RUNNER_NAME";

/// Environment variable toggling the console reporter
pub const ENV_CONSOLE: &str = "SCREENPLAY_CONSOLE";

/// Environment variable holding `tracing` filter directives
pub const ENV_LOG: &str = "SCREENPLAY_LOG";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized reporter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where reports go
    pub reports: ReportSettings,
    /// How the runner is presented
    pub runner: RunnerSettings,
}

/// Report output settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// Base directory for report sessions
    pub base_dir: String,
    /// Whether scene progress is logged to the console
    pub console: bool,
}

/// Runner presentation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Name announced when the runner is detected
    pub name: String,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            reports: ReportSettings::from_env(),
            runner: RunnerSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            reports: ReportSettings::defaults(),
            runner: RunnerSettings::defaults(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ReportSettings {
    pub fn from_env() -> Self {
        Self {
            base_dir: env::var(ENV_REPORT_DIR).unwrap_or_else(|_| DEFAULT_REPORT_DIR.to_string()),
            console: env::var(ENV_CONSOLE)
                .ok()
                .and_then(|s| parse_flag(&s))
                .unwrap_or(true),
        }
    }

    pub fn defaults() -> Self {
        Self {
            base_dir: DEFAULT_REPORT_DIR.to_string(),
            console: true,
        }
    }

    pub fn base_dir(mut self, dir: impl Into<String>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }
}

impl RunnerSettings {
    pub fn from_env() -> Self {
        Self {
            name: env::var(ENV_RUNNER_NAME)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RUNNER_NAME.to_string()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            name: DEFAULT_RUNNER_NAME.to_string(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a boolean flag: "1"/"true"/"yes"/"on" and "0"/"false"/"no"/"off"
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the report base directory (convenience function)
pub fn report_base_dir() -> String {
    get().reports.base_dir.clone()
}

/// Get the configured runner name (convenience function)
pub fn runner_name() -> String {
    get().runner.name.clone()
}

/// Whether the console reporter is enabled (convenience function)
pub fn console_enabled() -> bool {
    get().reports.console
}
