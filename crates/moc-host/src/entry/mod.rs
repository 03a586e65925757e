//! Entry-point discovery for projects in the virtual filesystem.
//!
//! Candidates are ranked, lower is better:
//!
//! 0. a conventionally named file in the project directory (`main.mo` /
//!    `Main.mo` for programs, `lib.mo` / `Lib.mo` for libraries);
//! 1. a conventionally named file in the project's `src` directory;
//! 2. programs only: the single source file in the project directory, when
//!    there is exactly one and it is not a library file.
//!
//! The best rank wins when it holds exactly one candidate. Two candidates at
//! the best rank (say `main.mo` next to `Main.mo`) are ambiguous and resolve
//! to nothing rather than a guess. Files inside a registered package
//! directory are never candidates unless the project itself lives in that
//! package.
//!
//! Resolution only lists directories: it never writes, fetches, or registers,
//! and it reports "nothing found" as `None`, never as an error.

use tracing::debug;

use crate::host::CompilerHost;
use crate::package::join_virtual;

const MAIN_NAMES: [&str; 2] = ["main.mo", "Main.mo"];
const LIB_NAMES: [&str; 2] = ["lib.mo", "Lib.mo"];
const SOURCE_DIRECTORY: &str = "src";
const SOURCE_EXTENSION: &str = ".mo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Main,
    Library,
}

impl EntryKind {
    const fn names(self) -> &'static [&'static str] {
        match self {
            Self::Main => &MAIN_NAMES,
            Self::Library => &LIB_NAMES,
        }
    }

    fn matches(self, file_name: &str) -> bool {
        self.names().contains(&file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    path: String,
    rank: u8,
}

impl<F> CompilerHost<F> {
    /// Finds the program entry point of the project in `directory` (`""` is
    /// the root).
    pub fn resolve_main(&mut self, directory: &str) -> Option<String> {
        self.resolve_entry(directory, EntryKind::Main)
    }

    /// Finds the library entry point of the project in `directory` (`""` is
    /// the root).
    pub fn resolve_lib(&mut self, directory: &str) -> Option<String> {
        self.resolve_entry(directory, EntryKind::Library)
    }

    fn resolve_entry(&mut self, directory: &str, kind: EntryKind) -> Option<String> {
        let candidates = self.entry_candidates(directory, kind);
        let resolved = pick(candidates);
        debug!(
            version = %self.invoker.version(),
            directory,
            ?kind,
            resolved = resolved.as_deref(),
            "resolved entry point"
        );
        resolved
    }

    fn entry_candidates(&mut self, directory: &str, kind: EntryKind) -> Vec<Candidate> {
        let entries = self.list_quietly(directory);
        let mut candidates = conventional(directory, &entries, kind, 0);

        if entries.iter().any(|entry| entry == SOURCE_DIRECTORY) {
            let source_dir = join_virtual(directory, SOURCE_DIRECTORY);
            let nested = self.list_quietly(&source_dir);
            candidates.extend(conventional(&source_dir, &nested, kind, 1));
        }

        if kind == EntryKind::Main {
            let mut sources = entries.iter().filter(|entry| {
                entry.ends_with(SOURCE_EXTENSION) && !EntryKind::Library.matches(entry)
            });
            if let (Some(only), None) = (sources.next(), sources.next()) {
                candidates.push(Candidate {
                    path: join_virtual(directory, only),
                    rank: 2,
                });
            }
        }

        candidates.retain(|candidate| !self.hidden_by_package(directory, &candidate.path));
        candidates
    }

    /// Whether `path` lies in a package directory that does not also contain
    /// the project directory.
    fn hidden_by_package(&self, directory: &str, path: &str) -> bool {
        self.packages.values().any(|package_dir| {
            is_within(path, package_dir) && !is_within(directory, package_dir)
        })
    }

    fn list_quietly(&mut self, directory: &str) -> Vec<String> {
        match self.list(directory) {
            Ok(entries) => entries,
            Err(error) => {
                debug!(
                    version = %self.invoker.version(),
                    directory,
                    %error,
                    "directory unavailable for entry point resolution"
                );
                Vec::new()
            }
        }
    }
}

fn conventional(directory: &str, entries: &[String], kind: EntryKind, rank: u8) -> Vec<Candidate> {
    entries
        .iter()
        .filter(|entry| kind.matches(entry))
        .map(|entry| Candidate {
            path: join_virtual(directory, entry),
            rank,
        })
        .collect()
}

/// Returns the only candidate at the best rank, if there is exactly one.
fn pick(candidates: Vec<Candidate>) -> Option<String> {
    let best = candidates.iter().map(|candidate| candidate.rank).min()?;
    let mut leaders = candidates
        .into_iter()
        .filter(|candidate| candidate.rank == best);
    match (leaders.next(), leaders.next()) {
        (Some(only), None) => Some(only.path),
        _ => None,
    }
}

fn is_within(path: &str, directory: &str) -> bool {
    let base = directory.trim_end_matches('/');
    if base.is_empty() {
        return true;
    }
    path == base
        || path
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}
