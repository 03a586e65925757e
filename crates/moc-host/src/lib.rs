//! Host-side facade over a compiler backend.
//!
//! The crate wraps an opaque backend behind the [`CompilerBackend`] trait and
//! exposes a uniform API over it: a virtual filesystem, package loading and
//! registration, entry-point discovery, and the compilation operations
//! (checking, interpretation, WebAssembly emission, interface extraction,
//! parsing). Every backend call passes through one invocation layer that turns
//! whatever the backend raises into a [`FacadeError`] and unwraps
//! `{code, diagnostics}` results into either the code or a
//! [`FacadeError::Compilation`].
//!
//! Package content is obtained through an injected [`PackageFetcher`], so
//! tests and embedders can supply their own transport.

mod aliases;
mod backend;
mod diagnostic;
mod entry;
mod errors;
mod host;
mod invoke;
mod package;
pub mod telemetry;
mod vfs;
mod wrapped;

#[cfg(test)]
mod tests;

pub use aliases::ActorAliases;
pub use backend::{
    BackendError, BackendFault, CompilerBackend, Operation, RunOutput, RunResult, TypedAst,
    WasmArtifact, WasmMode,
};
pub use diagnostic::{Diagnostic, DiagnosticCode, Position, Range, Severity, TargetedValue};
pub use errors::{ArgKind, FacadeError};
pub use host::CompilerHost;
pub use package::{DirectoryFetcher, FetchError, FetchedPackage, PackageDescriptor, PackageFetcher};
pub use vfs::SourceFile;
pub use wrapped::{RawWrapped, Wrapped};
