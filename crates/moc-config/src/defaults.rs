use crate::logging::LogFormat;

/// Default log filter expression used by hosts embedding the facade.
///
/// Facade events are kept at `info`; everything else only reports warnings.
pub const DEFAULT_LOG_FILTER: &str = "warn,moc_host=info";

/// Virtual directory under which fetched packages are materialised.
pub const DEFAULT_PACKAGE_ROOT: &str = ".packages";

/// Upper bound on package fetches awaited at the same time.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// Default log filter expression used by hosts embedding the facade.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned package root used where allocation is required.
#[must_use]
pub fn default_package_root_string() -> String {
    DEFAULT_PACKAGE_ROOT.to_owned()
}

/// Default fetch concurrency.
#[must_use]
pub const fn default_fetch_concurrency() -> usize {
    DEFAULT_FETCH_CONCURRENCY
}
