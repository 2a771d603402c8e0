//! Extension errors

use thiserror::Error;

/// Errors raised while loading or driving an extension
#[derive(Error, Debug)]
pub enum ExtensionError {
    /// The loader could not produce an instance
    #[error("failed to load extension from {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    /// Manifest is missing required fields
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// `initialize` failed
    #[error("initialization failed: {0}")]
    Initialize(String),

    /// `enable` failed
    #[error("enable failed: {0}")]
    Enable(String),

    /// `disable` failed
    #[error("disable failed: {0}")]
    Disable(String),

    /// The loader could not release the extension
    #[error("unload failed: {0}")]
    Unload(String),
}

impl ExtensionError {
    #[must_use]
    pub fn load(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
