//! ReAuth Extension Contract
//!
//! Optional authentication modules (password login, OAuth, ...) plug into
//! the service through this crate. An extension receives an
//! [`ExtensionContext`] at initialization: a capability handle on the
//! [`ExtensionHost`] for registering routes, session-check exemptions and
//! CORS additions, a logging span, and the shared session service it must
//! use to mint or revoke sessions.
//!
//! # Lifecycle
//!
//! ```ignore
//! let host = Arc::new(ExtensionHost::new());
//! let mut registry = ExtensionRegistry::new(Arc::clone(&host), sessions);
//!
//! let summary = registry.load_all(&mut loader).await;   // initialize + enable
//! let registrations = host.seal();                      // routes, exemptions, CORS
//! // ... serve ...
//! registry.shutdown(&mut loader).await;                 // disable + unload
//! ```

pub mod cors;
pub mod error;
pub mod extension;
pub mod host;
pub mod loader;
pub mod manifest;
pub mod registry;

pub use cors::CorsPolicy;
pub use error::ExtensionError;
pub use extension::{Extension, ExtensionContext};
pub use host::{
    normalize_extension_path, ExtensionHost, ExtensionRoutes, HostRegistrations, ROUTE_PREFIX,
};
pub use loader::{ExtensionFactory, ExtensionLoader, LoadResult, StaticLoader};
pub use manifest::ExtensionManifest;
pub use registry::{ExtensionRegistry, LoadSummary};
