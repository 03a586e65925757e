//! BDD test world encapsulating the host and the stub collaborators.

use crate::errors::FacadeError;
use crate::host::CompilerHost;
use crate::package::FetchedPackage;

use super::recording_backend::{RecordingBackend, RecordingBackendHandle};
use super::stub_fetcher::StubFetcher;
use super::TEST_VERSION;

/// Shared state exercised by BDD step implementations.
pub struct TestWorld {
    /// Host instance under test.
    pub host: CompilerHost<StubFetcher>,
    /// Handle onto the backend the host was built with.
    pub backend: RecordingBackendHandle,
    /// Last error observed while exercising the host.
    pub last_error: Option<FacadeError>,
    /// Last text value returned by the host.
    pub last_text: Option<String>,
}

impl TestWorld {
    /// World whose host has `backend` attached.
    pub fn loaded(backend: RecordingBackend) -> Self {
        let handle = backend.handle();
        Self {
            host: CompilerHost::new(TEST_VERSION, StubFetcher::new())
                .with_backend(Box::new(backend)),
            backend: handle,
            last_error: None,
            last_text: None,
        }
    }

    /// World whose host has no backend.
    pub fn unloaded() -> Self {
        Self {
            host: CompilerHost::new(TEST_VERSION, StubFetcher::new()),
            backend: RecordingBackend::new().handle(),
            last_error: None,
            last_text: None,
        }
    }

    /// Adds a served package to the host's fetcher.
    pub fn serve(&mut self, descriptor: &str, package: FetchedPackage) {
        let fetcher = std::mem::take(&mut self.host.fetcher);
        self.host.fetcher = fetcher.serving(descriptor, package);
    }

    /// Adds an unreachable source to the host's fetcher.
    pub fn refuse(&mut self, descriptor: &str, message: &str) {
        let fetcher = std::mem::take(&mut self.host.fetcher);
        self.host.fetcher = fetcher.unreachable(descriptor, message);
    }

    /// Stores the error of a failed call and returns the value of a
    /// successful one.
    pub fn capture<T>(&mut self, result: Result<T, FacadeError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(error) => {
                self.last_error = Some(error);
                None
            }
        }
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::loaded(RecordingBackend::new())
    }
}
