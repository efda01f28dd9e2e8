//! What a caller needs from the host

use serde::{Deserialize, Serialize};
use std::path::Path;

use avsc_api::{InterfaceVersion, SymbolDescriptor};

use crate::error::LoaderError;

/// Minimum interface version plus the entry points a caller cannot run without.
///
/// Can be built in code or read from TOML:
///
/// ```toml
/// required = ["avs_add_function", "avs_get_frame"]
///
/// [version]
/// major = 8
/// bugfix = 1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    /// Minimum interface version
    #[serde(default)]
    pub version: InterfaceVersion,
    /// Exported names that must resolve for the acquisition to succeed
    #[serde(default)]
    pub required: Vec<String>,
}

impl Requirements {
    pub fn new(version: InterfaceVersion) -> Self {
        Self {
            version,
            required: Vec::new(),
        }
    }

    /// Add a mandatory entry point
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Build from a (major, bugfix) pair and a list of mandatory names
    pub fn with_symbols<I, S>(major: i32, bugfix: i32, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version: InterfaceVersion::new(major, bugfix),
            required: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a TOML requirements document
    pub fn from_toml_str(content: &str) -> Result<Self, LoaderError> {
        toml::from_str(content).map_err(|e| LoaderError::InvalidRequirements(e.to_string()))
    }

    /// Load a TOML requirements document. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, LoaderError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LoaderError::InvalidRequirements(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Map the mandatory names onto the symbol index.
    ///
    /// Fails with [`LoaderError::UnknownRequiredSymbol`] on the first name the
    /// index does not know, without consulting the host.
    pub fn mandatory_descriptors(&self) -> Result<Vec<&'static SymbolDescriptor>, LoaderError> {
        self.required
            .iter()
            .map(|name| {
                SymbolDescriptor::find(name).ok_or_else(|| LoaderError::UnknownRequiredSymbol {
                    name: name.clone(),
                })
            })
            .collect()
    }
}
