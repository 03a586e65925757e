//! Shared fixtures and helpers for facade tests.

mod recording_backend;
mod stub_fetcher;
mod world;

use std::collections::BTreeMap;
use std::future::Future;

use rstest::fixture;

use crate::diagnostic::{Diagnostic, Position, Range, Severity};
use crate::host::CompilerHost;
use crate::package::FetchedPackage;

pub use recording_backend::{
    Failure, RecordedCall, RecordingBackend, RecordingBackendHandle, ResponseSet,
};
pub use stub_fetcher::StubFetcher;
pub use world::TestWorld;

/// Version label used by test hosts.
pub const TEST_VERSION: &str = "0.14.0";

/// Backend with an empty filesystem and default responses.
#[fixture]
pub fn recording() -> RecordingBackend {
    RecordingBackend::new()
}

/// Builds a host over `backend` and a fetcher, returning the backend handle.
pub fn host_with(
    backend: RecordingBackend,
    fetcher: StubFetcher,
) -> (CompilerHost<StubFetcher>, RecordingBackendHandle) {
    let handle = backend.handle();
    let host = CompilerHost::new(TEST_VERSION, fetcher).with_backend(Box::new(backend));
    (host, handle)
}

/// Diagnostic at the start of a file.
pub fn diagnostic(severity: Severity, message: &str) -> Diagnostic {
    let origin = Position::new(0, 0);
    Diagnostic::new(severity, message, Range::new(origin, origin))
}

/// Package with the given relative files at version `1.0.0`.
pub fn package(name: &str, files: &[(&str, &str)]) -> FetchedPackage {
    let contents = files
        .iter()
        .map(|(path, content)| ((*path).to_owned(), (*content).to_owned()))
        .collect::<BTreeMap<_, _>>();
    FetchedPackage::new(name, "1.0.0", contents)
}

/// Drives a future to completion on a current-thread runtime.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("test runtime")
        .block_on(future)
}
