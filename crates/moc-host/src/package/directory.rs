//! Fetcher for packages that already live on the local filesystem.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::{FetchError, FetchedPackage, PackageDescriptor, PackageFetcher};

/// Version reported for packages read from a local directory.
const LOCAL_VERSION: &str = "local";

/// Reads [`PackageDescriptor::Directory`] packages from disk.
///
/// Only files whose extension is in the configured list are collected; hidden
/// entries are skipped. Reads are blocking and run on the polling thread.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    extensions: Vec<String>,
}

impl Default for DirectoryFetcher {
    fn default() -> Self {
        Self::new(vec![String::from("mo")])
    }
}

impl DirectoryFetcher {
    /// Creates a fetcher collecting files with the given extensions.
    #[must_use]
    pub const fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    fn read_package(&self, root: &Path) -> Result<FetchedPackage, FetchError> {
        let mut files = BTreeMap::new();
        self.collect(root, root, &mut files)?;
        let name = root
            .file_name()
            .map(|component| component.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(path = %root.display(), files = files.len(), "read local package");
        Ok(FetchedPackage::new(name, LOCAL_VERSION, files))
    }

    fn collect(
        &self,
        root: &Path,
        directory: &Path,
        files: &mut BTreeMap<String, String>,
    ) -> Result<(), FetchError> {
        let entries = fs::read_dir(directory).map_err(|source| io_error(directory, source))?;
        for item in entries {
            let entry = item.map_err(|source| io_error(directory, source))?;
            let path = entry.path();
            if is_hidden(&path) {
                continue;
            }
            let file_type = entry
                .file_type()
                .map_err(|source| io_error(&path, source))?;
            if file_type.is_dir() {
                self.collect(root, &path, files)?;
            } else if file_type.is_file() && self.accepts(&path) {
                let bytes = fs::read(&path).map_err(|source| io_error(&path, source))?;
                let content = String::from_utf8(bytes).map_err(|_| FetchError::Encoding {
                    path: path.clone(),
                })?;
                files.insert(relative_key(root, &path), content);
            }
        }
        Ok(())
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| self.extensions.iter().any(|known| known == extension))
    }
}

impl PackageFetcher for DirectoryFetcher {
    async fn fetch(&self, descriptor: &PackageDescriptor) -> Result<FetchedPackage, FetchError> {
        match descriptor {
            PackageDescriptor::Directory { path } => self.read_package(path),
            PackageDescriptor::Repository { .. } => Err(FetchError::Unsupported {
                descriptor: descriptor.to_string(),
            }),
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn io_error(path: &Path, source: std::io::Error) -> FetchError {
    FetchError::Io {
        path: PathBuf::from(path),
        source: Arc::new(source),
    }
}
