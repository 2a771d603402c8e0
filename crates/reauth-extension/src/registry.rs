//! Extension lifecycle driver

use std::sync::Arc;

use reauth_core::SharedSessionService;
use tracing::{debug, error, info, info_span, warn};

use crate::error::ExtensionError;
use crate::extension::{Extension, ExtensionContext};
use crate::host::ExtensionHost;
use crate::loader::ExtensionLoader;
use crate::manifest::ExtensionManifest;

/// Outcome of [`ExtensionRegistry::load_all`]
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Sources whose extension is now enabled
    pub enabled: Vec<String>,
    /// Sources that failed, with the reason
    pub failed: Vec<(String, String)>,
}

impl LoadSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

struct ActiveExtension {
    source: String,
    extension: Box<dyn Extension>,
}

/// Owns enabled extensions and drives their lifecycle.
///
/// One extension failing to load, initialize or enable is logged and
/// skipped; the others are unaffected. Each extension registers against its
/// own staging host, committed to the shared host only after `enable`
/// succeeds.
pub struct ExtensionRegistry {
    host: Arc<ExtensionHost>,
    sessions: SharedSessionService,
    active: Vec<ActiveExtension>,
}

impl ExtensionRegistry {
    pub fn new(host: Arc<ExtensionHost>, sessions: SharedSessionService) -> Self {
        Self {
            host,
            sessions,
            active: Vec::new(),
        }
    }

    pub fn host(&self) -> &Arc<ExtensionHost> {
        &self.host
    }

    /// Manifests of enabled extensions, in load order
    pub fn manifests(&self) -> Vec<ExtensionManifest> {
        self.active
            .iter()
            .map(|a| a.extension.manifest().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Load, initialize and enable everything the loader provides
    pub async fn load_all(&mut self, loader: &mut dyn ExtensionLoader) -> LoadSummary {
        let mut summary = LoadSummary::default();

        for (source, loaded) in loader.load() {
            let outcome = match loaded {
                Ok(extension) => self.start(&source, extension).await,
                Err(e) => Err((e, None)),
            };

            match outcome {
                Ok(()) => summary.enabled.push(source),
                Err((e, rejected)) => {
                    error!(source = %source, error = %e, "Extension failed to start, skipping");
                    if let Some(extension) = rejected {
                        if let Err(e) = loader.unload(&source, extension) {
                            warn!(source = %source, error = %e, "Failed to unload rejected extension");
                        }
                    }
                    summary.failed.push((source, e.to_string()));
                }
            }
        }

        info!(
            enabled = summary.enabled.len(),
            failed = summary.failed.len(),
            "Extensions loaded"
        );
        summary
    }

    async fn start(
        &mut self,
        source: &str,
        mut extension: Box<dyn Extension>,
    ) -> Result<(), (ExtensionError, Option<Box<dyn Extension>>)> {
        let manifest = extension.manifest().clone();
        if let Err(e) = manifest.validate() {
            return Err((e, Some(extension)));
        }

        // Registrations stay staged until the extension is enabled
        let staging = Arc::new(ExtensionHost::staging(&manifest.name));
        let context = ExtensionContext {
            host: Arc::clone(&staging),
            logger: info_span!("extension", name = %manifest.name),
            sessions: Arc::clone(&self.sessions),
        };

        let started = match extension.initialize(context).await {
            Ok(()) => extension.enable().await,
            Err(e) => Err(e),
        };
        let staged = staging.seal();
        if let Err(e) = started {
            debug!(
                name = %manifest.name,
                routes = staged.route_count(),
                "Discarding registrations of failed extension"
            );
            return Err((e, Some(extension)));
        }
        self.host.commit(staged);

        info!(
            source,
            name = %manifest.name,
            version = %manifest.version,
            author = %manifest.author,
            "Extension enabled"
        );
        self.active.push(ActiveExtension {
            source: source.to_string(),
            extension,
        });
        Ok(())
    }

    /// Disable every extension in reverse load order, then unload it
    pub async fn shutdown(&mut self, loader: &mut dyn ExtensionLoader) {
        while let Some(ActiveExtension {
            source,
            mut extension,
        }) = self.active.pop()
        {
            let name = extension.manifest().name.clone();
            if let Err(e) = extension.disable().await {
                error!(source = %source, name = %name, error = %e, "Extension failed to disable");
            }
            match loader.unload(&source, extension) {
                Ok(()) => info!(source = %source, name = %name, "Extension unloaded"),
                Err(e) => {
                    error!(source = %source, name = %name, error = %e, "Extension failed to unload")
                }
            }
        }
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field(
                "active",
                &self.active.iter().map(|a| &a.source).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
