//! The extension trait and the context it is initialized with

use std::sync::Arc;

use async_trait::async_trait;
use reauth_core::SharedSessionService;

use crate::error::ExtensionError;
use crate::host::ExtensionHost;
use crate::manifest::ExtensionManifest;

/// Capabilities an extension receives at initialization.
///
/// Extensions keep whatever parts they need; nothing is injected later.
#[derive(Clone)]
pub struct ExtensionContext {
    /// Route, exemption and CORS registration
    pub host: Arc<ExtensionHost>,
    /// Span named after the extension; enter it (or use `.in_scope`) to log
    pub logger: tracing::Span,
    /// Session service for minting and revoking sessions
    pub sessions: SharedSessionService,
}

impl std::fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("host", &self.host)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

/// An optional authentication module.
///
/// The registry calls [`initialize`](Self::initialize) then
/// [`enable`](Self::enable) at startup, and [`disable`](Self::disable) on
/// shutdown before the loader releases the instance. An extension that
/// verifies credentials must mint sessions through
/// [`ExtensionContext::sessions`].
#[async_trait]
pub trait Extension: Send + Sync {
    /// Static description of the extension
    fn manifest(&self) -> &ExtensionManifest;

    /// Register routes and exemptions, keep the capabilities needed later
    async fn initialize(&mut self, context: ExtensionContext) -> Result<(), ExtensionError>;

    /// Start serving
    async fn enable(&mut self) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Stop serving and release resources
    async fn disable(&mut self) -> Result<(), ExtensionError> {
        Ok(())
    }
}
