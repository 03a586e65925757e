//! Package descriptors, the fetch collaborator, and registration.
//!
//! A [`PackageFetcher`] turns a [`PackageDescriptor`] into a
//! [`FetchedPackage`]: the package's source files held in memory. The facade
//! then materialises those files into the backend's virtual filesystem and
//! registers the resulting directory under the package name (see
//! [`crate::CompilerHost::load_packages`]).
//!
//! Transport is out of scope here. The bundled [`DirectoryFetcher`] only
//! understands local directories; repository descriptors need a fetcher
//! supplied by the embedding application.

mod directory;
mod manager;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::directory::DirectoryFetcher;

/// Where a dependency comes from.
///
/// # Example
///
/// ```
/// use moc_host::PackageDescriptor;
///
/// let repo = PackageDescriptor::from("dfinity/motoko-base@0.11.1");
/// assert!(matches!(repo, PackageDescriptor::Repository { .. }));
///
/// let local = PackageDescriptor::from("vendor/base/src");
/// assert!(matches!(local, PackageDescriptor::Directory { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackageDescriptor {
    /// Direct reference to a local directory holding the sources.
    Directory {
        /// Directory on the host filesystem.
        path: PathBuf,
    },
    /// Versioned repository reference.
    Repository {
        /// Repository identifier, e.g. `owner/name`.
        repository: String,
        /// Release tag, branch, or commit.
        version: String,
        /// Subdirectory holding the sources, if not the repository root.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        directory: Option<String>,
    },
}

impl From<&str> for PackageDescriptor {
    fn from(text: &str) -> Self {
        match text.rsplit_once('@') {
            Some((repository, version)) if !repository.is_empty() && !version.is_empty() => {
                Self::Repository {
                    repository: repository.to_owned(),
                    version: version.to_owned(),
                    directory: None,
                }
            }
            _ => Self::Directory {
                path: PathBuf::from(text),
            },
        }
    }
}

impl From<String> for PackageDescriptor {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory { path } => write!(formatter, "{}", path.display()),
            Self::Repository {
                repository,
                version,
                directory: None,
            } => write!(formatter, "{repository}@{version}"),
            Self::Repository {
                repository,
                version,
                directory: Some(directory),
            } => write!(formatter, "{repository}@{version}:{directory}"),
        }
    }
}

/// Package content held in memory after a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPackage {
    name: String,
    version: String,
    files: BTreeMap<String, String>,
}

impl FetchedPackage {
    /// Creates a package from its files, keyed by `/`-separated relative path.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        files: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            files,
        }
    }

    /// Name reported by the source.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Resolved version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Source files keyed by relative path.
    #[must_use]
    pub const fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }
}

/// Errors reported by fetch collaborators.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source could not be reached.
    #[error("package source '{source_name}' is unreachable: {message}")]
    Unreachable {
        /// Descriptor that could not be reached.
        source_name: String,
        /// Transport-level description.
        message: String,
    },

    /// The requested version does not exist.
    #[error("version '{version}' of '{repository}' was not found")]
    VersionNotFound {
        /// Repository that was queried.
        repository: String,
        /// Version that was requested.
        version: String,
    },

    /// Downloaded content did not match the expected checksum.
    #[error("integrity check failed for '{package}': expected {expected}, got {actual}")]
    Integrity {
        /// Package being verified.
        package: String,
        /// Expected digest.
        expected: String,
        /// Digest of the received content.
        actual: String,
    },

    /// The fetcher cannot handle this kind of descriptor.
    #[error("cannot fetch '{descriptor}' with this fetcher")]
    Unsupported {
        /// Rendered descriptor.
        descriptor: String,
    },

    /// A source file was not valid UTF-8.
    #[error("package file '{path}' is not valid UTF-8")]
    Encoding {
        /// Offending file.
        path: PathBuf,
    },

    /// Reading local content failed.
    #[error("failed to read package content at '{path}': {source}")]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Resolves descriptors into package content.
///
/// Implementations own transport, caching, and integrity checks. The facade
/// awaits several fetches at once, so implementations must tolerate
/// concurrent calls through a shared reference.
pub trait PackageFetcher {
    /// Fetches the package described by `descriptor`.
    fn fetch(
        &self,
        descriptor: &PackageDescriptor,
    ) -> impl Future<Output = Result<FetchedPackage, FetchError>> + Send;
}

/// Checks that a package name or version can be used as one virtual
/// directory component.
pub(crate) fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("must not be empty");
    }
    if name.contains(['/', '\\']) {
        return Err("must not contain path separators");
    }
    if name == "." || name == ".." {
        return Err("must not be a relative directory");
    }
    Ok(())
}

/// Checks that a fetched file key stays inside its package directory.
pub(crate) fn validate_relative(path: &str) -> Result<(), &'static str> {
    if path.starts_with('/') {
        return Err("must be relative");
    }
    if path.contains('\\') {
        return Err("must use `/` separators");
    }
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err("must not contain empty, `.`, or `..` segments");
    }
    Ok(())
}

/// Joins virtual path segments with `/`, treating an empty base as the root.
pub(crate) fn join_virtual(base: &str, relative: &str) -> String {
    let trimmed_base = base.trim_end_matches('/');
    let trimmed_relative = relative.trim_start_matches('/');
    if trimmed_base.is_empty() {
        trimmed_relative.to_owned()
    } else {
        format!("{trimmed_base}/{trimmed_relative}")
    }
}
