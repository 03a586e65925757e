//! Pass-through access to the backend's virtual filesystem.
//!
//! Path validity and existence are the backend's business; the only check
//! made here is that written content is text.

use tracing::debug;

use crate::backend::{Operation, RunOutput, TypedAst, WasmArtifact};
use crate::diagnostic::Diagnostic;
use crate::errors::{ArgKind, FacadeError};
use crate::host::CompilerHost;
use crate::invoke::CallContext;

impl<F> CompilerHost<F> {
    /// Reads a file from the virtual filesystem.
    ///
    /// # Errors
    ///
    /// Returns invocation errors, including the backend's own error for
    /// missing files.
    pub fn read(&mut self, path: &str) -> Result<String, FacadeError> {
        let context = CallContext::new(Operation::ReadFile, &[ArgKind::Text]);
        self.invoker.call(context, |backend| backend.read_file(path))
    }

    /// Creates or overwrites a file with text content.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::NonTextContent`] without contacting the backend
    /// when `content` is not valid UTF-8.
    pub fn write(&mut self, path: &str, content: impl AsRef<[u8]>) -> Result<(), FacadeError> {
        let text = std::str::from_utf8(content.as_ref()).map_err(|_| {
            FacadeError::NonTextContent {
                path: path.to_owned(),
            }
        })?;
        debug!(version = %self.invoker.version(), path, "+file");
        let context = CallContext::new(Operation::SaveFile, &[ArgKind::Text, ArgKind::Text]);
        self.invoker
            .call(context, |backend| backend.save_file(path, text))
    }

    /// Moves a file within the virtual filesystem.
    ///
    /// # Errors
    ///
    /// Returns invocation errors.
    pub fn rename(&mut self, path: &str, new_path: &str) -> Result<(), FacadeError> {
        let context = CallContext::new(Operation::RenameFile, &[ArgKind::Text, ArgKind::Text]);
        self.invoker
            .call(context, |backend| backend.rename_file(path, new_path))
    }

    /// Deletes a file from the virtual filesystem.
    ///
    /// # Errors
    ///
    /// Returns invocation errors.
    pub fn delete(&mut self, path: &str) -> Result<(), FacadeError> {
        debug!(version = %self.invoker.version(), path, "-file");
        let context = CallContext::new(Operation::RemoveFile, &[ArgKind::Text]);
        self.invoker.call(context, |backend| backend.remove_file(path))
    }

    /// Lists entry names in a virtual directory.
    ///
    /// # Errors
    ///
    /// Returns invocation errors.
    pub fn list(&mut self, directory: &str) -> Result<Vec<String>, FacadeError> {
        let context = CallContext::new(Operation::ReadDir, &[ArgKind::Text]);
        self.invoker
            .call(context, |backend| backend.read_dir(directory))
    }

    /// Returns a handle bound to one virtual path.
    pub fn file(&mut self, path: impl Into<String>) -> SourceFile<'_, F> {
        SourceFile {
            host: self,
            path: path.into(),
        }
    }
}

/// Handle that runs facade operations against a single path.
///
/// # Example
///
/// ```no_run
/// # fn demo(host: &mut moc_host::CompilerHost) -> Result<(), moc_host::FacadeError> {
/// let mut file = host.file("Main.mo");
/// file.write("actor { public func ping() : async () {} }")?;
/// let interface = file.candid()?;
/// file.rename("Ping.mo")?;
/// assert_eq!(file.path(), "Ping.mo");
/// # let _ = interface;
/// # Ok(())
/// # }
/// ```
pub struct SourceFile<'h, F> {
    host: &'h mut CompilerHost<F>,
    path: String,
}

impl<F> SourceFile<'_, F> {
    /// Path the handle currently points at.
    #[must_use]
    pub const fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Reads the file.
    ///
    /// # Errors
    ///
    /// See [`CompilerHost::read`].
    pub fn read(&mut self) -> Result<String, FacadeError> {
        self.host.read(&self.path)
    }

    /// Overwrites the file.
    ///
    /// # Errors
    ///
    /// See [`CompilerHost::write`].
    pub fn write(&mut self, content: impl AsRef<[u8]>) -> Result<(), FacadeError> {
        self.host.write(&self.path, content)
    }

    /// Moves the file and points the handle at the new path.
    ///
    /// # Errors
    ///
    /// See [`CompilerHost::rename`]; the handle keeps its old path on failure.
    pub fn rename(&mut self, new_path: impl Into<String>) -> Result<(), FacadeError> {
        let target = new_path.into();
        self.host.rename(&self.path, &target)?;
        self.path = target;
        Ok(())
    }

    /// Deletes the file.
    ///
    /// # Errors
    ///
    /// See [`CompilerHost::delete`].
    pub fn delete(&mut self) -> Result<(), FacadeError> {
        self.host.delete(&self.path)
    }

    /// Type-checks the file.
    ///
    /// # Errors
    ///
    /// See [`CompilerHost::check`].
    pub fn check(&mut self) -> Result<Vec<Diagnostic>, FacadeError> {
        self.host.check(&self.path)
    }

    /// Interprets the file.
    ///
    /// # Errors
    ///
    /// See [`CompilerHost::run`].
    pub fn run(&mut self, lib_paths: Option<&[String]>) -> Result<RunOutput, FacadeError> {
        self.host.run(&self.path, lib_paths)
    }

    /// Compiles the file to WebAssembly.
    ///
    /// # Errors
    ///
    /// See [`CompilerHost::wasm`].
    pub fn wasm(&mut self, mode: Option<&str>) -> Result<WasmArtifact, FacadeError> {
        self.host.wasm(&self.path, mode)
    }

    /// Extracts the file's Candid interface.
    ///
    /// # Errors
    ///
    /// See [`CompilerHost::candid`].
    pub fn candid(&mut self) -> Result<String, FacadeError> {
        self.host.candid(&self.path)
    }

    /// Reads the file and parses it into an AST.
    ///
    /// # Errors
    ///
    /// See [`CompilerHost::parse_source`].
    pub fn parse_source(&mut self) -> Result<serde_json::Value, FacadeError> {
        let content = self.read()?;
        self.host.parse_source(&content)
    }

    /// Reads the file and parses it into a typed AST.
    ///
    /// # Errors
    ///
    /// See [`CompilerHost::parse_source_types`].
    pub fn parse_source_types(&mut self) -> Result<TypedAst, FacadeError> {
        let content = self.read()?;
        self.host.parse_source_types(&content)
    }
}
