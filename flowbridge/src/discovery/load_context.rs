//! The seam to the host runtime's module loader.

use super::identity::ModuleIdentity;
use crate::errors::LoadError;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;

/// Loads discovered modules into the current execution context.
///
/// The real loader belongs to the host runtime; the adapter only decides
/// which modules to hand to it. Implementations must treat a repeated load
/// of the same identity as an error or a no-op, never as a second copy.
pub trait ModuleLoadContext: Send + Sync {
    /// Attempts to load the module at `path` under the given identity.
    fn load(&self, identity: &ModuleIdentity, path: &Path) -> Result<(), LoadError>;
}

/// A load context that records requests instead of loading.
///
/// Useful in tests and in hosts that only need to observe discovery.
/// Individual modules can be made to fail by name to exercise the scanner's
/// fault isolation.
#[derive(Debug, Default)]
pub struct CollectingLoadContext {
    loaded: Mutex<Vec<ModuleIdentity>>,
    failing: Mutex<HashSet<String>>,
}

impl CollectingLoadContext {
    /// Creates a new collecting load context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes loads of the named module fail.
    pub fn fail_for(&self, name: impl Into<String>) {
        self.failing.lock().insert(name.into());
    }

    /// Returns the identities loaded so far.
    #[must_use]
    pub fn loaded(&self) -> Vec<ModuleIdentity> {
        self.loaded.lock().clone()
    }

    /// Returns the names loaded so far, sorted.
    #[must_use]
    pub fn loaded_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .loaded
            .lock()
            .iter()
            .map(|identity| identity.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Returns the number of successful loads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loaded.lock().len()
    }

    /// Returns true if nothing was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaded.lock().is_empty()
    }
}

impl ModuleLoadContext for CollectingLoadContext {
    fn load(&self, identity: &ModuleIdentity, _path: &Path) -> Result<(), LoadError> {
        if self.failing.lock().contains(&identity.name) {
            return Err(LoadError::rejected(&identity.name, "induced load failure"));
        }
        self.loaded.lock().push(identity.clone());
        Ok(())
    }
}
