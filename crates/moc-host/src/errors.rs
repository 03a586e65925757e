//! Error types surfaced by the compiler facade.

use std::fmt;

use thiserror::Error;

use crate::backend::{BackendError, Operation};
use crate::diagnostic::{Diagnostic, join_messages};
use crate::package::FetchError;

/// Runtime kind of an argument passed to a backend operation.
///
/// Failure reports list kinds rather than values so large file contents never
/// end up in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Text such as a path or source content.
    Text,
    /// Ordered sequence.
    List,
    /// Structured value.
    Object,
}

impl ArgKind {
    /// Label used in failure reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::List => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors returned by [`crate::CompilerHost`].
#[derive(Debug, Error)]
pub enum FacadeError {
    /// No backend is attached to the facade.
    #[error("load a compiler backend before running this operation")]
    NotLoaded,

    /// The operation name is unknown or the attached backend lacks it.
    #[error("unknown compiler operation '{name}'")]
    UnknownOperation {
        /// Name requested by the caller.
        name: String,
    },

    /// The backend raised a recognised error; passed through untouched.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The backend raised something that is not an error object.
    #[error("unable to execute {operation}({argument_kinds}):\n{payload}")]
    Invocation {
        /// Operation that failed.
        operation: Operation,
        /// Comma-separated kinds of the arguments passed.
        argument_kinds: String,
        /// JSON view of what the backend raised.
        payload: String,
    },

    /// A code-producing operation returned no code.
    #[error("{message}")]
    Compilation {
        /// Operation that failed.
        operation: Operation,
        /// Diagnostic messages joined by `; `, or `(no diagnostics)`.
        message: String,
        /// Diagnostics reported by the backend.
        diagnostics: Vec<Diagnostic>,
    },

    /// File content was not valid UTF-8 text.
    #[error("non-text content for file '{path}'")]
    NonTextContent {
        /// Target path of the rejected write.
        path: String,
    },

    /// WebAssembly emission mode outside `ic` and `wasi`.
    #[error("invalid WASM format: {mode}")]
    InvalidMode {
        /// Mode supplied by the caller.
        mode: String,
    },

    /// Package name cannot be used as a directory component.
    #[error("invalid package name '{name}': {reason}")]
    InvalidPackageName {
        /// Rejected name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },

    /// A fetched package cannot be placed under the package root.
    #[error("package '{name}' cannot be installed: {field} '{value}' {reason}")]
    InvalidPackageContent {
        /// Name the package was requested under.
        name: String,
        /// Which part of the package was rejected (`version` or `file`).
        field: &'static str,
        /// Rejected value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// The fetch collaborator failed; passed through untouched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl FacadeError {
    /// Builds an `UnknownOperation` error.
    pub(crate) fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownOperation { name: name.into() }
    }

    /// Builds an `Invocation` error from the opaque payload.
    pub(crate) fn invocation(
        operation: Operation,
        argument_kinds: &[ArgKind],
        payload: &serde_json::Value,
    ) -> Self {
        let kinds = argument_kinds
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let rendered = serde_json::to_string(payload)
            .unwrap_or_else(|error| format!("<unserialisable payload: {error}>"));
        Self::Invocation {
            operation,
            argument_kinds: kinds,
            payload: rendered,
        }
    }

    /// Builds a `Compilation` error from failure diagnostics.
    pub(crate) fn compilation(operation: Operation, diagnostics: Option<Vec<Diagnostic>>) -> Self {
        let message = join_messages(diagnostics.as_deref());
        Self::Compilation {
            operation,
            message,
            diagnostics: diagnostics.unwrap_or_default(),
        }
    }
}
