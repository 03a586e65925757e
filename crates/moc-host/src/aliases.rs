//! Actor alias table and public metadata forwarding.

use tracing::debug;

use crate::backend::Operation;
use crate::errors::{ArgKind, FacadeError};
use crate::host::CompilerHost;
use crate::invoke::CallContext;

/// Ordered mapping from actor name to alias.
///
/// Iteration follows first insertion. Inserting a name that is already
/// present replaces its alias without moving it, since backends give earlier
/// entries priority on conflict.
///
/// # Example
///
/// ```
/// use moc_host::ActorAliases;
///
/// let mut aliases = ActorAliases::new();
/// aliases.insert("ledger", "ryjl3-tyaaa-aaaaa-aaaba-cai");
/// aliases.insert("cmc", "rkp4c-7iaaa-aaaaa-aaaca-cai");
/// aliases.insert("ledger", "bkyz2-fmaaa-aaaaa-qaaaq-cai");
///
/// let names: Vec<_> = aliases.iter().map(|(name, _)| name).collect();
/// assert_eq!(names, ["ledger", "cmc"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorAliases {
    entries: Vec<(String, String)>,
}

impl ActorAliases {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces an alias.
    pub fn insert(&mut self, name: impl Into<String>, alias: impl Into<String>) {
        let key = name.into();
        let value = alias.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Alias registered for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, alias)| alias.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(name, alias)| (name.as_str(), alias.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the table is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as `[name, alias]` pairs, the shape backends receive.
    #[must_use]
    pub const fn as_pairs(&self) -> &[(String, String)] {
        self.entries.as_slice()
    }
}

impl<K, V> FromIterator<(K, V)> for ActorAliases
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut aliases = Self::new();
        for (name, alias) in iter {
            aliases.insert(name, alias);
        }
        aliases
    }
}

impl<F> CompilerHost<F> {
    /// Replaces the backend's whole alias table.
    ///
    /// # Errors
    ///
    /// Returns invocation errors.
    pub fn set_aliases(&mut self, aliases: &ActorAliases) -> Result<(), FacadeError> {
        debug!(
            version = %self.invoker.version(),
            aliases = ?aliases.as_pairs(),
            "aliases"
        );
        let context = CallContext::new(Operation::SetActorAliases, &[ArgKind::List]);
        self.invoker
            .call(context, |backend| backend.set_actor_aliases(aliases.as_pairs()))
    }

    /// Forwards an opaque, already serialised metadata blob.
    ///
    /// # Errors
    ///
    /// Returns invocation errors.
    pub fn set_metadata(&mut self, values: &str) -> Result<(), FacadeError> {
        let context = CallContext::new(Operation::SetPublicMetadata, &[ArgKind::Text]);
        self.invoker
            .call(context, |backend| backend.set_public_metadata(values))
    }
}
