//! Facade that mediates access to a compiler backend.

use std::collections::BTreeMap;
use std::str::FromStr;

use moc_config::Config;
use tracing::debug;

use crate::backend::{
    CompilerBackend, Operation, RunOutput, TypedAst, WasmArtifact, WasmMode,
};
use crate::diagnostic::Diagnostic;
use crate::errors::{ArgKind, FacadeError};
use crate::invoke::{CallContext, Invoker};
use crate::package::DirectoryFetcher;

/// Compiler facade composing the virtual filesystem, package registry, entry
/// point resolution, and compilation operations over one backend.
///
/// The backend is not reentrant: every operation takes `&mut self`, and callers
/// sharing a host across threads must serialise access themselves.
pub struct CompilerHost<F = DirectoryFetcher> {
    pub(crate) invoker: Invoker,
    pub(crate) fetcher: F,
    pub(crate) config: Config,
    pub(crate) packages: BTreeMap<String, String>,
}

impl<F> CompilerHost<F> {
    /// Builds a host with default configuration and no backend attached.
    #[must_use]
    pub fn new(version: impl Into<String>, fetcher: F) -> Self {
        Self::with_config(version, fetcher, Config::default())
    }

    /// Builds a host with explicit configuration and no backend attached.
    #[must_use]
    pub fn with_config(version: impl Into<String>, fetcher: F, config: Config) -> Self {
        Self {
            invoker: Invoker::new(version),
            fetcher,
            config,
            packages: BTreeMap::new(),
        }
    }

    /// Attaches a backend, replacing any previous one.
    #[must_use]
    pub fn with_backend(mut self, backend: Box<dyn CompilerBackend>) -> Self {
        self.attach(backend);
        self
    }

    /// Attaches a backend, replacing any previous one.
    ///
    /// Package registrations mirrored by the host describe the previous
    /// backend and are forgotten.
    pub fn attach(&mut self, backend: Box<dyn CompilerBackend>) {
        debug!(version = %self.invoker.version(), "attached compiler backend");
        self.packages.clear();
        self.invoker.attach(backend);
    }

    /// Detaches and returns the current backend.
    pub fn detach(&mut self) -> Option<Box<dyn CompilerBackend>> {
        self.packages.clear();
        self.invoker.detach()
    }

    /// Whether a backend is attached.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.invoker.is_loaded()
    }

    /// Compiler version label supplied at construction.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.invoker.version()
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves an operation name against the attached backend.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::NotLoaded`] without a backend and
    /// [`FacadeError::UnknownOperation`] when the name is not a backend
    /// operation or the backend build lacks it.
    pub fn operation(&self, name: &str) -> Result<Operation, FacadeError> {
        self.invoker.operation(name)
    }

    /// Type-checks a file and returns every diagnostic, successful or not.
    ///
    /// # Errors
    ///
    /// Returns invocation errors only; diagnostics never fail the call.
    pub fn check(&mut self, path: &str) -> Result<Vec<Diagnostic>, FacadeError> {
        let context = CallContext::new(Operation::Check, &[ArgKind::Text]);
        self.invoker.call(context, |backend| backend.check(path))
    }

    /// Interprets a file with optional library search paths.
    ///
    /// # Errors
    ///
    /// Returns invocation errors; traps are reported in [`RunOutput::result`].
    pub fn run(
        &mut self,
        path: &str,
        lib_paths: Option<&[String]>,
    ) -> Result<RunOutput, FacadeError> {
        let search_paths = lib_paths.unwrap_or_default();
        let context = CallContext::new(Operation::Run, &[ArgKind::List, ArgKind::Text]);
        self.invoker
            .call(context, |backend| backend.run(search_paths, path))
    }

    /// Compiles a file to WebAssembly. A missing or empty `mode` means `ic`.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::InvalidMode`] for modes other than `ic` and
    /// `wasi` before contacting the backend, and
    /// [`FacadeError::Compilation`] when no module was produced.
    pub fn wasm(&mut self, path: &str, mode: Option<&str>) -> Result<WasmArtifact, FacadeError> {
        let wasm_mode = match mode {
            None | Some("") => WasmMode::default(),
            Some(name) => WasmMode::from_str(name).map_err(|_| FacadeError::InvalidMode {
                mode: name.to_owned(),
            })?,
        };
        let context = CallContext::new(Operation::CompileWasm, &[ArgKind::Text, ArgKind::Text]);
        self.invoker
            .call_unwrapped(context, |backend| backend.compile_wasm(wasm_mode, path))
    }

    /// Extracts the Candid interface of the actor defined in a file.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Compilation`] when no interface was produced.
    pub fn candid(&mut self, path: &str) -> Result<String, FacadeError> {
        let context = CallContext::new(Operation::Candid, &[ArgKind::Text]);
        self.invoker
            .call_unwrapped(context, |backend| backend.candid(path))
    }

    /// Parses source text into an AST.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Compilation`] on syntax errors.
    pub fn parse_source(&mut self, content: &str) -> Result<serde_json::Value, FacadeError> {
        let context = CallContext::new(Operation::ParseMotoko, &[ArgKind::Text]);
        self.invoker
            .call_unwrapped(context, |backend| backend.parse_motoko(content))
    }

    /// Parses source text into an AST annotated with the output type.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Compilation`] on syntax or type errors.
    pub fn parse_source_types(&mut self, content: &str) -> Result<TypedAst, FacadeError> {
        let context = CallContext::new(Operation::ParseMotokoTypes, &[ArgKind::Text]);
        self.invoker
            .call_unwrapped(context, |backend| backend.parse_motoko_types(content))
    }

    /// Parses a Candid interface description.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Compilation`] on syntax errors.
    pub fn parse_interface(&mut self, content: &str) -> Result<serde_json::Value, FacadeError> {
        let context = CallContext::new(Operation::ParseCandid, &[ArgKind::Text]);
        self.invoker
            .call_unwrapped(context, |backend| backend.parse_candid(content))
    }
}
