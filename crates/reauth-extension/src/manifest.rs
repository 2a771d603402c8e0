//! Extension manifest

use serde::{Deserialize, Serialize};

use crate::error::ExtensionError;

/// Descriptive metadata every extension declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    pub name: String,
    pub version: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl ExtensionManifest {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            author: author.into(),
            description: String::new(),
            website: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Check the required fields are present
    pub fn validate(&self) -> Result<(), ExtensionError> {
        for (field, value) in [
            ("name", &self.name),
            ("version", &self.version),
            ("author", &self.author),
        ] {
            if value.trim().is_empty() {
                return Err(ExtensionError::InvalidManifest(format!("{field} is empty")));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ExtensionManifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} by {}", self.name, self.version, self.author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let manifest = ExtensionManifest::new("password", "1.0.0", "reprivatize");
        assert!(manifest.validate().is_ok());

        let manifest = ExtensionManifest::new("", "1.0.0", "reprivatize");
        assert!(matches!(
            manifest.validate(),
            Err(ExtensionError::InvalidManifest(_))
        ));
    }

    #[test]
    fn test_deserialize_optional_fields() {
        let json = r#"{"name":"password","version":"1.0.0","author":"mt"}"#;
        let manifest: ExtensionManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.description, "");
        assert_eq!(manifest.website, None);
        assert_eq!(manifest.to_string(), "password v1.0.0 by mt");
    }
}
