//! Package loading and registration on the facade.

use std::collections::BTreeMap;

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::{debug, warn};

use super::{
    FetchedPackage, PackageDescriptor, PackageFetcher, join_virtual, validate_name,
    validate_relative,
};
use crate::backend::Operation;
use crate::errors::{ArgKind, FacadeError};
use crate::host::CompilerHost;
use crate::invoke::CallContext;

impl<F> CompilerHost<F> {
    /// Registers a virtual directory under a package name.
    ///
    /// # Errors
    ///
    /// Returns invocation errors; the local registration view is only updated
    /// when the backend accepted the package.
    pub fn add_package(&mut self, name: &str, directory: &str) -> Result<(), FacadeError> {
        debug!(version = %self.invoker.version(), package = name, directory, "+package");
        let context = CallContext::new(Operation::AddPackage, &[ArgKind::Text, ArgKind::Text]);
        self.invoker
            .call(context, |backend| backend.add_package(name, directory))?;
        self.packages.insert(name.to_owned(), directory.to_owned());
        Ok(())
    }

    /// Drops every package registration.
    ///
    /// # Errors
    ///
    /// Returns invocation errors; the local view is left untouched on failure.
    pub fn clear_packages(&mut self) -> Result<(), FacadeError> {
        debug!(version = %self.invoker.version(), "-packages");
        let context = CallContext::new(Operation::ClearPackage, &[]);
        self.invoker.call(context, |backend| backend.clear_package())?;
        self.packages.clear();
        Ok(())
    }

    /// Package registrations made through this host, keyed by name.
    #[must_use]
    pub const fn packages(&self) -> &BTreeMap<String, String> {
        &self.packages
    }

    /// Virtual directory a fetched package is materialised into.
    fn package_directory(&self, name: &str, package: &FetchedPackage) -> String {
        let by_name = join_virtual(self.config.package_root(), name);
        join_virtual(&by_name, package.version())
    }

    /// Writes every package and registers it, restoring the previous
    /// registration set if any step fails. Contents are checked before
    /// anything is written.
    fn install(&mut self, fetched: &BTreeMap<String, FetchedPackage>) -> Result<(), FacadeError> {
        for (name, package) in fetched {
            check_contents(name, package)?;
        }
        let snapshot = self.packages.clone();
        for (name, package) in fetched {
            if let Err(error) = self.materialise(name, package) {
                warn!(
                    version = %self.invoker.version(),
                    package = name.as_str(),
                    %error,
                    "package installation failed; restoring registrations"
                );
                self.restore(&snapshot);
                return Err(error);
            }
        }
        Ok(())
    }

    fn materialise(&mut self, name: &str, package: &FetchedPackage) -> Result<(), FacadeError> {
        let directory = self.package_directory(name, package);
        for (relative, content) in package.files() {
            self.write(&join_virtual(&directory, relative), content)?;
        }
        self.add_package(name, &directory)
    }

    fn restore(&mut self, snapshot: &BTreeMap<String, String>) {
        if let Err(error) = self.clear_packages() {
            warn!(
                version = %self.invoker.version(),
                %error,
                "failed to clear packages during restore"
            );
            return;
        }
        for (name, directory) in snapshot {
            if let Err(error) = self.add_package(name, directory) {
                warn!(
                    version = %self.invoker.version(),
                    package = name.as_str(),
                    %error,
                    "failed to re-register package during restore"
                );
            }
        }
    }
}

impl<F: PackageFetcher> CompilerHost<F> {
    /// Fetches one package without registering it.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Fetch`] with the fetcher's error unchanged.
    pub async fn fetch_package(
        &self,
        descriptor: impl Into<PackageDescriptor>,
    ) -> Result<FetchedPackage, FacadeError> {
        let target = descriptor.into();
        debug!(version = %self.invoker.version(), descriptor = %target, "fetching package");
        Ok(self.fetcher.fetch(&target).await?)
    }

    /// Fetches the named packages concurrently, then materialises and
    /// registers each one.
    ///
    /// The call is all-or-nothing. A fetch failure rejects it before anything
    /// is written or registered. A failure while writing or registering
    /// restores the registrations that existed before the call; files already
    /// written stay in the virtual filesystem. If the same name appears twice,
    /// the last descriptor wins.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::InvalidPackageName`] before fetching when a name
    /// cannot be used as a directory, [`FacadeError::Fetch`] when any fetch
    /// fails, [`FacadeError::InvalidPackageContent`] before any write when a
    /// fetched version or file path would escape the package directory, or
    /// the invocation error that interrupted installation.
    pub async fn load_packages<I, N, D>(&mut self, packages: I) -> Result<(), FacadeError>
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: Into<PackageDescriptor>,
    {
        let requested = packages
            .into_iter()
            .map(|(name, descriptor)| (name.into(), descriptor.into()))
            .collect::<BTreeMap<String, PackageDescriptor>>();
        for name in requested.keys() {
            validate_name(name).map_err(|reason| FacadeError::InvalidPackageName {
                name: name.clone(),
                reason,
            })?;
        }

        let fetched = fetch_all(
            &self.fetcher,
            &requested,
            self.config.fetch_concurrency(),
            self.invoker.version(),
        )
        .await?;
        self.install(&fetched)
    }
}

/// Rejects versions and file keys that would escape
/// `<package_root>/<name>/<version>`.
fn check_contents(name: &str, package: &FetchedPackage) -> Result<(), FacadeError> {
    let rejected = |field, value: &str, reason| FacadeError::InvalidPackageContent {
        name: name.to_owned(),
        field,
        value: value.to_owned(),
        reason,
    };
    validate_name(package.version())
        .map_err(|reason| rejected("version", package.version(), reason))?;
    for relative in package.files().keys() {
        validate_relative(relative).map_err(|reason| rejected("file", relative, reason))?;
    }
    Ok(())
}

/// Awaits every fetch, at most `concurrency` at a time, stopping at the first
/// failure.
async fn fetch_all<F: PackageFetcher>(
    fetcher: &F,
    requested: &BTreeMap<String, PackageDescriptor>,
    concurrency: usize,
    version: &str,
) -> Result<BTreeMap<String, FetchedPackage>, FacadeError> {
    let fetched = stream::iter(requested.iter().map(|(name, descriptor)| async move {
        debug!(version, package = name.as_str(), %descriptor, "fetching package");
        fetcher
            .fetch(descriptor)
            .await
            .map(|package| (name.clone(), package))
    }))
    .buffer_unordered(concurrency)
    .try_collect::<BTreeMap<_, _>>()
    .await?;
    Ok(fetched)
}
