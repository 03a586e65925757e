//! Single chokepoint between the facade and the backend.
//!
//! Every backend call goes through [`Invoker::call`], which checks that a
//! backend is attached and provides the operation, then normalises whatever
//! the backend raises into [`FacadeError`]. Code-producing operations go
//! through [`Invoker::call_unwrapped`], which additionally turns a
//! [`Wrapped::Failure`] into [`FacadeError::Compilation`].

use std::str::FromStr;

use tracing::{debug, warn};

use crate::backend::{BackendFault, CompilerBackend, Operation};
use crate::errors::{ArgKind, FacadeError};
use crate::wrapped::Wrapped;

/// Describes one backend call for checks and failure reports.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CallContext<'a> {
    operation: Operation,
    arguments: &'a [ArgKind],
}

impl<'a> CallContext<'a> {
    pub(crate) const fn new(operation: Operation, arguments: &'a [ArgKind]) -> Self {
        Self {
            operation,
            arguments,
        }
    }
}

pub(crate) struct Invoker {
    backend: Option<Box<dyn CompilerBackend>>,
    version: String,
}

impl Invoker {
    pub(crate) fn new(version: impl Into<String>) -> Self {
        Self {
            backend: None,
            version: version.into(),
        }
    }

    pub(crate) const fn version(&self) -> &str {
        self.version.as_str()
    }

    pub(crate) fn attach(&mut self, backend: Box<dyn CompilerBackend>) {
        self.backend = Some(backend);
    }

    pub(crate) fn detach(&mut self) -> Option<Box<dyn CompilerBackend>> {
        self.backend.take()
    }

    pub(crate) const fn is_loaded(&self) -> bool {
        self.backend.is_some()
    }

    /// Resolves an operation name against the attached backend.
    pub(crate) fn operation(&self, name: &str) -> Result<Operation, FacadeError> {
        let backend = self.backend.as_deref().ok_or(FacadeError::NotLoaded)?;
        let operation = Operation::from_str(name).map_err(|_| FacadeError::unknown(name))?;
        if backend.supports(operation) {
            Ok(operation)
        } else {
            Err(FacadeError::unknown(name))
        }
    }

    /// Calls the backend and returns its value unchanged.
    pub(crate) fn call<T, F>(&mut self, context: CallContext<'_>, call: F) -> Result<T, FacadeError>
    where
        F: FnOnce(&mut dyn CompilerBackend) -> Result<T, BackendFault>,
    {
        let CallContext {
            operation,
            arguments,
        } = context;
        let backend = self.backend.as_deref_mut().ok_or(FacadeError::NotLoaded)?;
        if !backend.supports(operation) {
            return Err(FacadeError::unknown(operation.to_string()));
        }

        debug!(
            version = %self.version,
            %operation,
            arguments = arguments.len(),
            "invoking compiler backend"
        );
        call(backend).map_err(|fault| match fault {
            BackendFault::Error(error) => {
                warn!(version = %self.version, %operation, %error, "compiler backend failed");
                FacadeError::Backend(error)
            }
            BackendFault::Opaque(payload) => {
                warn!(
                    version = %self.version,
                    %operation,
                    "compiler backend raised a non-error value"
                );
                FacadeError::invocation(operation, arguments, &payload)
            }
        })
    }

    /// Calls a code-producing operation and keeps only its code.
    pub(crate) fn call_unwrapped<T, F>(
        &mut self,
        context: CallContext<'_>,
        call: F,
    ) -> Result<T, FacadeError>
    where
        F: FnOnce(&mut dyn CompilerBackend) -> Result<Wrapped<T>, BackendFault>,
    {
        let operation = context.operation;
        self.call(context, call)?.into_code().map_err(|diagnostics| {
            debug!(
                version = %self.version,
                %operation,
                "compiler backend returned no code"
            );
            FacadeError::compilation(operation, diagnostics)
        })
    }
}
