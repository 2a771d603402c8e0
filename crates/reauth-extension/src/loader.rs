//! Loader seam
//!
//! How extensions are discovered and linked is up to the loader. The
//! registry only sees instances, or the reason one could not be produced.

use tracing::debug;

use crate::error::ExtensionError;
use crate::extension::Extension;

/// Result of loading one extension source
pub type LoadResult = Result<Box<dyn Extension>, ExtensionError>;

/// Produces extension instances and releases them again
pub trait ExtensionLoader: Send {
    /// Load every available extension. Each entry names its source (a file,
    /// a crate, a registry key) so failures can be reported per source.
    fn load(&mut self) -> Vec<(String, LoadResult)>;

    /// Release an extension after it has been disabled
    fn unload(&mut self, source: &str, extension: Box<dyn Extension>) -> Result<(), ExtensionError>;
}

/// Constructor for a statically linked extension
pub type ExtensionFactory = Box<dyn Fn() -> LoadResult + Send + Sync>;

/// Loader over a fixed list of constructors
#[derive(Default)]
pub struct StaticLoader {
    factories: Vec<(String, ExtensionFactory)>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under a source name
    #[must_use]
    pub fn with<F>(mut self, source: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> LoadResult + Send + Sync + 'static,
    {
        self.factories.push((source.into(), Box::new(factory)));
        self
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl ExtensionLoader for StaticLoader {
    fn load(&mut self) -> Vec<(String, LoadResult)> {
        self.factories
            .iter()
            .map(|(source, factory)| (source.clone(), factory()))
            .collect()
    }

    fn unload(&mut self, source: &str, extension: Box<dyn Extension>) -> Result<(), ExtensionError> {
        debug!(source, name = %extension.manifest().name, "Extension released");
        drop(extension);
        Ok(())
    }
}

impl std::fmt::Debug for StaticLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticLoader")
            .field(
                "sources",
                &self.factories.iter().map(|(s, _)| s).collect::<Vec<_>>(),
            )
            .finish()
    }
}
