//! In-memory package fetcher used in tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::package::{FetchError, FetchedPackage, PackageDescriptor, PackageFetcher};

/// Result a stub fetch resolves to.
#[derive(Debug, Clone)]
pub enum StubOutcome {
    /// The package is served.
    Package(FetchedPackage),
    /// The source cannot be reached.
    Unreachable(String),
}

/// Fetcher answering from a table keyed by rendered descriptor.
///
/// Descriptors missing from the table are reported as unsupported.
#[derive(Debug, Clone, Default)]
pub struct StubFetcher {
    outcomes: BTreeMap<String, StubOutcome>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    /// Creates a fetcher that serves nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `package` for `descriptor`.
    pub fn serving(mut self, descriptor: &str, package: FetchedPackage) -> Self {
        self.outcomes
            .insert(descriptor.to_owned(), StubOutcome::Package(package));
        self
    }

    /// Fails fetches of `descriptor` as unreachable.
    pub fn unreachable(mut self, descriptor: &str, message: &str) -> Self {
        self.outcomes.insert(
            descriptor.to_owned(),
            StubOutcome::Unreachable(message.to_owned()),
        );
        self
    }

    /// Descriptors requested so far, in request order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl PackageFetcher for StubFetcher {
    async fn fetch(&self, descriptor: &PackageDescriptor) -> Result<FetchedPackage, FetchError> {
        let key = descriptor.to_string();
        self.fetched
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(key.clone());
        match self.outcomes.get(&key) {
            Some(StubOutcome::Package(package)) => Ok(package.clone()),
            Some(StubOutcome::Unreachable(message)) => Err(FetchError::Unreachable {
                source_name: key,
                message: message.clone(),
            }),
            None => Err(FetchError::Unsupported { descriptor: key }),
        }
    }
}
