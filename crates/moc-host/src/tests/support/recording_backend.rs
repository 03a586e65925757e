//! Recording compiler backend used in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::backend::{
    BackendError, BackendFault, CompilerBackend, Operation, RunOutput, RunResult, TypedAst,
    WasmArtifact, WasmMode,
};
use crate::diagnostic::Diagnostic;
use crate::wrapped::Wrapped;

/// One call observed by the stub backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Operation that was invoked.
    pub operation: Operation,
    /// Arguments rendered as text, in positional order.
    pub arguments: Vec<String>,
}

/// What an injected failure raises.
#[derive(Debug, Clone)]
pub enum Failure {
    /// A recognised error with the given message.
    Error(String),
    /// A non-error value.
    Opaque(serde_json::Value),
}

impl Failure {
    fn into_fault(self) -> BackendFault {
        match self {
            Self::Error(message) => BackendFault::Error(BackendError::new(message)),
            Self::Opaque(payload) => BackendFault::Opaque(payload),
        }
    }
}

#[derive(Debug)]
struct FailureRule {
    operation: Operation,
    skip: usize,
    failure: Failure,
}

/// Canned results for the compilation operations.
#[derive(Debug, Clone)]
pub struct ResponseSet {
    /// Diagnostics returned by `check`.
    pub diagnostics: Vec<Diagnostic>,
    /// Output returned by `run`.
    pub run: RunOutput,
    /// Result returned by `compileWasm`.
    pub wasm: Wrapped<WasmArtifact>,
    /// Result returned by `candid`.
    pub candid: Wrapped<String>,
    /// Result returned by `parseMotoko`.
    pub ast: Wrapped<serde_json::Value>,
    /// Result returned by `parseMotokoTypes`.
    pub typed_ast: Wrapped<TypedAst>,
    /// Result returned by `parseCandid`.
    pub interface: Wrapped<serde_json::Value>,
}

impl Default for ResponseSet {
    fn default() -> Self {
        Self {
            diagnostics: Vec::new(),
            run: RunOutput {
                stdout: String::new(),
                stderr: String::new(),
                result: RunResult::ExitCode(0),
            },
            wasm: Wrapped::success(WasmArtifact {
                wasm: vec![0x00, 0x61, 0x73, 0x6d],
                candid: String::from("service : {}"),
            }),
            candid: Wrapped::success(String::from("service : {}")),
            ast: Wrapped::success(json!({ "name": "Prog" })),
            typed_ast: Wrapped::success(TypedAst {
                ast: json!({ "name": "Prog" }),
                output_type: json!({ "name": "()" }),
            }),
            interface: Wrapped::success(json!({ "service": {} })),
        }
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    files: BTreeMap<String, String>,
    packages: BTreeMap<String, String>,
    aliases: Vec<(String, String)>,
    metadata: Option<String>,
    calls: Vec<RecordedCall>,
    responses: ResponseSet,
    unsupported: BTreeSet<Operation>,
    failures: Vec<FailureRule>,
}

impl RecordingState {
    fn begin(&mut self, operation: Operation, arguments: &[&str]) -> Result<(), BackendFault> {
        self.calls.push(RecordedCall {
            operation,
            arguments: arguments.iter().map(|argument| (*argument).to_owned()).collect(),
        });
        match self.take_failure(operation) {
            Some(failure) => Err(failure.into_fault()),
            None => Ok(()),
        }
    }

    fn take_failure(&mut self, operation: Operation) -> Option<Failure> {
        let position = self
            .failures
            .iter()
            .position(|rule| rule.operation == operation)?;
        let rule = self.failures.get_mut(position)?;
        if rule.skip > 0 {
            rule.skip -= 1;
            return None;
        }
        Some(self.failures.remove(position).failure)
    }

    fn list(&self, directory: &str) -> Result<Vec<String>, BackendFault> {
        let prefix = directory.trim_end_matches('/');
        let mut children = BTreeSet::new();
        for path in self.files.keys() {
            let rest = if prefix.is_empty() {
                Some(path.as_str())
            } else {
                path.strip_prefix(prefix)
                    .and_then(|tail| tail.strip_prefix('/'))
            };
            if let Some(child) = rest.and_then(|tail| tail.split('/').next()) {
                children.insert(child.to_owned());
            }
        }
        if children.is_empty() && !prefix.is_empty() {
            return Err(not_found("directory", directory));
        }
        Ok(children.into_iter().collect())
    }
}

fn not_found(kind: &str, path: &str) -> BackendFault {
    BackendFault::Error(BackendError::new(format!("{kind} not found: {path}")))
}

/// Test double that keeps an in-memory filesystem and records every call.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    shared: Arc<Mutex<RecordingState>>,
}

impl RecordingBackend {
    /// Creates a backend with default responses and an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file without recording a call.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        with_state(&self.shared, |state| {
            state.files.insert(path.to_owned(), content.to_owned());
        });
        self
    }

    /// Replaces the canned compilation results.
    pub fn with_responses(self, responses: ResponseSet) -> Self {
        with_state(&self.shared, |state| state.responses = responses);
        self
    }

    /// Reports `operation` as missing from this build.
    pub fn without(self, operation: Operation) -> Self {
        with_state(&self.shared, |state| {
            state.unsupported.insert(operation);
        });
        self
    }

    /// Fails the call to `operation` that follows `skip` successful ones.
    pub fn failing(self, operation: Operation, skip: usize, failure: Failure) -> Self {
        with_state(&self.shared, |state| {
            state.failures.push(FailureRule {
                operation,
                skip,
                failure,
            });
        });
        self
    }

    /// Returns a handle that can be used to assert recorded state.
    pub fn handle(&self) -> RecordingBackendHandle {
        RecordingBackendHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    fn respond<T>(
        &self,
        operation: Operation,
        arguments: &[&str],
        pick: impl FnOnce(&ResponseSet) -> T,
    ) -> Result<T, BackendFault> {
        with_state(&self.shared, |state| {
            state.begin(operation, arguments)?;
            Ok(pick(&state.responses))
        })
    }
}

impl CompilerBackend for RecordingBackend {
    fn supports(&self, operation: Operation) -> bool {
        with_state(&self.shared, |state| !state.unsupported.contains(&operation))
    }

    fn read_file(&mut self, path: &str) -> Result<String, BackendFault> {
        with_state(&self.shared, |state| {
            state.begin(Operation::ReadFile, &[path])?;
            state
                .files
                .get(path)
                .cloned()
                .ok_or_else(|| not_found("file", path))
        })
    }

    fn save_file(&mut self, path: &str, content: &str) -> Result<(), BackendFault> {
        with_state(&self.shared, |state| {
            state.begin(Operation::SaveFile, &[path, content])?;
            state.files.insert(path.to_owned(), content.to_owned());
            Ok(())
        })
    }

    fn rename_file(&mut self, path: &str, new_path: &str) -> Result<(), BackendFault> {
        with_state(&self.shared, |state| {
            state.begin(Operation::RenameFile, &[path, new_path])?;
            let content = state
                .files
                .remove(path)
                .ok_or_else(|| not_found("file", path))?;
            state.files.insert(new_path.to_owned(), content);
            Ok(())
        })
    }

    fn remove_file(&mut self, path: &str) -> Result<(), BackendFault> {
        with_state(&self.shared, |state| {
            state.begin(Operation::RemoveFile, &[path])?;
            state
                .files
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| not_found("file", path))
        })
    }

    fn read_dir(&mut self, directory: &str) -> Result<Vec<String>, BackendFault> {
        with_state(&self.shared, |state| {
            state.begin(Operation::ReadDir, &[directory])?;
            state.list(directory)
        })
    }

    fn add_package(&mut self, name: &str, directory: &str) -> Result<(), BackendFault> {
        with_state(&self.shared, |state| {
            state.begin(Operation::AddPackage, &[name, directory])?;
            state.packages.insert(name.to_owned(), directory.to_owned());
            Ok(())
        })
    }

    fn clear_package(&mut self) -> Result<(), BackendFault> {
        with_state(&self.shared, |state| {
            state.begin(Operation::ClearPackage, &[])?;
            state.packages.clear();
            Ok(())
        })
    }

    fn set_actor_aliases(&mut self, aliases: &[(String, String)]) -> Result<(), BackendFault> {
        let rendered = aliases
            .iter()
            .map(|(name, alias)| format!("{name}={alias}"))
            .collect::<Vec<_>>();
        let arguments = rendered.iter().map(String::as_str).collect::<Vec<_>>();
        with_state(&self.shared, |state| {
            state.begin(Operation::SetActorAliases, &arguments)?;
            state.aliases = aliases.to_vec();
            Ok(())
        })
    }

    fn set_public_metadata(&mut self, values: &str) -> Result<(), BackendFault> {
        with_state(&self.shared, |state| {
            state.begin(Operation::SetPublicMetadata, &[values])?;
            state.metadata = Some(values.to_owned());
            Ok(())
        })
    }

    fn check(&mut self, path: &str) -> Result<Vec<Diagnostic>, BackendFault> {
        self.respond(Operation::Check, &[path], |responses| {
            responses.diagnostics.clone()
        })
    }

    fn run(&mut self, lib_paths: &[String], path: &str) -> Result<RunOutput, BackendFault> {
        let joined = lib_paths.join(":");
        self.respond(Operation::Run, &[&joined, path], |responses| {
            responses.run.clone()
        })
    }

    fn compile_wasm(
        &mut self,
        mode: WasmMode,
        path: &str,
    ) -> Result<Wrapped<WasmArtifact>, BackendFault> {
        let rendered = mode.to_string();
        self.respond(Operation::CompileWasm, &[&rendered, path], |responses| {
            responses.wasm.clone()
        })
    }

    fn candid(&mut self, path: &str) -> Result<Wrapped<String>, BackendFault> {
        self.respond(Operation::Candid, &[path], |responses| {
            responses.candid.clone()
        })
    }

    fn parse_motoko(&mut self, content: &str) -> Result<Wrapped<serde_json::Value>, BackendFault> {
        self.respond(Operation::ParseMotoko, &[content], |responses| {
            responses.ast.clone()
        })
    }

    fn parse_motoko_types(&mut self, content: &str) -> Result<Wrapped<TypedAst>, BackendFault> {
        self.respond(Operation::ParseMotokoTypes, &[content], |responses| {
            responses.typed_ast.clone()
        })
    }

    fn parse_candid(&mut self, content: &str) -> Result<Wrapped<serde_json::Value>, BackendFault> {
        self.respond(Operation::ParseCandid, &[content], |responses| {
            responses.interface.clone()
        })
    }
}

/// Handle that exposes recorded state for assertions.
#[derive(Clone)]
pub struct RecordingBackendHandle {
    shared: Arc<Mutex<RecordingState>>,
}

impl RecordingBackendHandle {
    /// Every call the backend observed, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        with_state(&self.shared, |state| state.calls.clone())
    }

    /// Operations the backend observed, in order.
    pub fn operations(&self) -> Vec<Operation> {
        with_state(&self.shared, |state| {
            state.calls.iter().map(|call| call.operation).collect()
        })
    }

    /// Number of calls made to `operation`.
    pub fn count(&self, operation: Operation) -> usize {
        with_state(&self.shared, |state| {
            state
                .calls
                .iter()
                .filter(|call| call.operation == operation)
                .count()
        })
    }

    /// Snapshot of the in-memory filesystem.
    pub fn files(&self) -> BTreeMap<String, String> {
        with_state(&self.shared, |state| state.files.clone())
    }

    /// Package registrations held by the backend.
    pub fn packages(&self) -> BTreeMap<String, String> {
        with_state(&self.shared, |state| state.packages.clone())
    }

    /// Alias table last received.
    pub fn aliases(&self) -> Vec<(String, String)> {
        with_state(&self.shared, |state| state.aliases.clone())
    }

    /// Metadata blob last received.
    pub fn metadata(&self) -> Option<String> {
        with_state(&self.shared, |state| state.metadata.clone())
    }
}

fn with_state<R, F>(shared: &Arc<Mutex<RecordingState>>, action: F) -> R
where
    F: FnOnce(&mut RecordingState) -> R,
{
    let mut guard = shared.lock().unwrap_or_else(|poison| poison.into_inner());
    action(&mut guard)
}
