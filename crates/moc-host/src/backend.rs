//! Abstractions over concrete compiler backends.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::wrapped::Wrapped;

/// Named operations exposed by a compiler backend.
///
/// The textual form matches the names backends export (`readFile`,
/// `compileWasm`, ...), so names coming from scripts can be checked with
/// [`str::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, Display)]
#[strum(serialize_all = "camelCase")]
pub enum Operation {
    /// Read a file from the virtual filesystem.
    ReadFile,
    /// Create or overwrite a file in the virtual filesystem.
    SaveFile,
    /// Move a file within the virtual filesystem.
    RenameFile,
    /// Delete a file from the virtual filesystem.
    RemoveFile,
    /// List a virtual directory.
    ReadDir,
    /// Register a package directory.
    AddPackage,
    /// Drop every package registration.
    ClearPackage,
    /// Replace the actor alias table.
    SetActorAliases,
    /// Set the public metadata blob.
    SetPublicMetadata,
    /// Type-check a file.
    Check,
    /// Interpret a file.
    Run,
    /// Emit a WebAssembly module.
    CompileWasm,
    /// Extract the Candid interface of an actor.
    Candid,
    /// Parse source text into an AST.
    ParseMotoko,
    /// Parse source text into an AST annotated with types.
    ParseMotokoTypes,
    /// Parse a Candid interface description.
    ParseCandid,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::ReadFile,
        Self::SaveFile,
        Self::RenameFile,
        Self::RemoveFile,
        Self::ReadDir,
        Self::AddPackage,
        Self::ClearPackage,
        Self::SetActorAliases,
        Self::SetPublicMetadata,
        Self::Check,
        Self::Run,
        Self::CompileWasm,
        Self::Candid,
        Self::ParseMotoko,
        Self::ParseMotokoTypes,
        Self::ParseCandid,
    ];
}

/// Target flavour for WebAssembly emission.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WasmMode {
    /// Internet Computer canister module.
    #[default]
    Ic,
    /// Standalone WASI module.
    Wasi,
}

/// Output of a WebAssembly compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasmArtifact {
    /// Module bytes.
    pub wasm: Vec<u8>,
    /// Candid interface emitted alongside the module.
    pub candid: String,
}

/// AST paired with the inferred type of the program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedAst {
    /// Opaque syntax tree.
    pub ast: serde_json::Value,
    /// Opaque description of the program's output type.
    #[serde(rename = "outputType")]
    pub output_type: serde_json::Value,
}

/// How an interpreted program finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunResult {
    /// Numeric exit status.
    ExitCode(i64),
    /// Trap description.
    Trap(String),
}

/// Captured output of an interpreted program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Text written to standard output.
    pub stdout: String,
    /// Text written to standard error.
    pub stderr: String,
    /// Exit status or trap.
    pub result: RunResult,
}

/// Recognised error raised by a backend.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl BackendError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-friendly description without the optional source.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Failure raised by a backend operation.
#[derive(Debug)]
pub enum BackendFault {
    /// A proper error object; surfaced to callers as-is.
    Error(BackendError),
    /// Anything else the backend threw, kept as a JSON view for reporting.
    Opaque(serde_json::Value),
}

impl From<BackendError> for BackendFault {
    fn from(error: BackendError) -> Self {
        Self::Error(error)
    }
}

/// Behaviour required from concrete compiler bindings.
///
/// Each method mirrors one named backend operation and receives its arguments
/// positionally. Implementations own the virtual filesystem and the package
/// table; the facade never inspects either directly.
pub trait CompilerBackend: Send {
    /// Whether this backend build provides the operation.
    fn supports(&self, _operation: Operation) -> bool {
        true
    }

    /// `readFile(path)`.
    fn read_file(&mut self, path: &str) -> Result<String, BackendFault>;

    /// `saveFile(path, content)`.
    fn save_file(&mut self, path: &str, content: &str) -> Result<(), BackendFault>;

    /// `renameFile(path, newPath)`.
    fn rename_file(&mut self, path: &str, new_path: &str) -> Result<(), BackendFault>;

    /// `removeFile(path)`.
    fn remove_file(&mut self, path: &str) -> Result<(), BackendFault>;

    /// `readDir(directory)`; returns entry names, not full paths.
    fn read_dir(&mut self, directory: &str) -> Result<Vec<String>, BackendFault>;

    /// `addPackage(name, directory)`.
    fn add_package(&mut self, name: &str, directory: &str) -> Result<(), BackendFault>;

    /// `clearPackage()`.
    fn clear_package(&mut self) -> Result<(), BackendFault>;

    /// `setActorAliases(entries)`; earlier entries win on conflict.
    fn set_actor_aliases(&mut self, aliases: &[(String, String)]) -> Result<(), BackendFault>;

    /// `setPublicMetadata(values)`.
    fn set_public_metadata(&mut self, values: &str) -> Result<(), BackendFault>;

    /// `check(path)`; returns diagnostics whether or not checking succeeded.
    fn check(&mut self, path: &str) -> Result<Vec<Diagnostic>, BackendFault>;

    /// `run(libPaths, path)`.
    fn run(&mut self, lib_paths: &[String], path: &str) -> Result<RunOutput, BackendFault>;

    /// `compileWasm(mode, path)`.
    fn compile_wasm(
        &mut self,
        mode: WasmMode,
        path: &str,
    ) -> Result<Wrapped<WasmArtifact>, BackendFault>;

    /// `candid(path)`.
    fn candid(&mut self, path: &str) -> Result<Wrapped<String>, BackendFault>;

    /// `parseMotoko(content)`.
    fn parse_motoko(&mut self, content: &str) -> Result<Wrapped<serde_json::Value>, BackendFault>;

    /// `parseMotokoTypes(content)`.
    fn parse_motoko_types(&mut self, content: &str) -> Result<Wrapped<TypedAst>, BackendFault>;

    /// `parseCandid(content)`.
    fn parse_candid(&mut self, content: &str) -> Result<Wrapped<serde_json::Value>, BackendFault>;
}

impl fmt::Debug for dyn CompilerBackend {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("CompilerBackend")
    }
}
