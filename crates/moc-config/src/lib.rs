//! Shared configuration for hosts embedding the compiler facade.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file, then `MOC_*` environment variables, then command-line
//! flags. The facade only reads the resolved [`Config`]; it never loads
//! configuration on its own.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_FETCH_CONCURRENCY, DEFAULT_LOG_FILTER, DEFAULT_PACKAGE_ROOT,
    default_fetch_concurrency, default_log_filter, default_log_filter_string,
    default_log_format, default_package_root_string,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for the compiler host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "MOC")]
pub struct Config {
    /// `tracing` filter expression applied by the telemetry subscriber.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Virtual directory that receives materialised packages.
    #[ortho_config(default = default_package_root_string())]
    pub package_root: String,
    /// Maximum number of package fetches in flight at once.
    #[ortho_config(default = default_fetch_concurrency())]
    pub fetch_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            package_root: default_package_root_string(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

impl Config {
    /// Filter expression for the telemetry subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for log records.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Virtual directory that receives materialised packages, without a
    /// trailing separator.
    #[must_use]
    pub fn package_root(&self) -> &str {
        self.package_root.trim_end_matches('/')
    }

    /// Fetch concurrency, never lower than one.
    #[must_use]
    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency.max(1)
    }
}
