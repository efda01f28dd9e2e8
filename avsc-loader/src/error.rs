//! Loader error types

use avsc_api::InterfaceVersion;
use thiserror::Error;

/// Why an acquisition failed.
///
/// Every variant is fatal to the acquisition that produced it and to nothing
/// else; the loader is back in a clean state by the time one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// The host library could not be opened
    #[error("Failed to load avisynth library ({library}). Is AviSynth+ installed correctly? ({reason})")]
    LibraryNotFound { library: String, reason: String },

    /// An entry point needed for version introspection or shutdown is absent
    #[error("Failed to load required loader function: {name} (incompatible or corrupt AviSynth+ install)")]
    MissingBootstrapSymbol { name: String },

    /// The host's interface version is below the caller's minimum
    #[error("AviSynth C API error: plugin requires >= {requested}, found {}", found_text(.found, .requested))]
    VersionTooOld {
        requested: InterfaceVersion,
        /// `None` when the host can only answer whether a major version is supported
        found: Option<InterfaceVersion>,
    },

    /// A caller-declared mandatory entry point is not exported by the host
    #[error("Failed to load required function: {name}")]
    MissingMandatorySymbol { name: String },

    /// A caller-declared mandatory name is not in the known symbol list
    #[error("Internal error: unknown function requested as required: {name}")]
    UnknownRequiredSymbol { name: String },

    /// The loader was observed mid-initialization by another acquirer
    #[error("AviSynth C API is still being initialized by another caller")]
    ConcurrentInitRace,

    /// A requirements document could not be read or parsed
    #[error("Invalid requirements: {0}")]
    InvalidRequirements(String),
}

fn found_text(found: &Option<InterfaceVersion>, requested: &InterfaceVersion) -> String {
    match found {
        Some(version) => version.to_string(),
        None => format!(
            "unknown (host only reports that interface {} is unsupported)",
            requested.major
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_not_found_display() {
        let err = LoaderError::LibraryNotFound {
            library: "libavisynth.so".to_string(),
            reason: "cannot open shared object file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("libavisynth.so"));
        assert!(msg.contains("installed correctly"));
    }

    #[test]
    fn test_version_too_old_display_with_host_version() {
        let err = LoaderError::VersionTooOld {
            requested: InterfaceVersion::new(3, 5),
            found: Some(InterfaceVersion::new(3, 2)),
        };
        assert!(err.to_string().contains("requires >= 3.5, found 3.2"));
    }

    #[test]
    fn test_version_too_old_display_without_host_version() {
        let err = LoaderError::VersionTooOld {
            requested: InterfaceVersion::new(9, 0),
            found: None,
        };
        let msg = err.to_string();
        assert!(msg.contains("requires >= 9.0"));
        assert!(msg.contains("found unknown"));
        assert!(!msg.contains("found 0"));
    }

    #[test]
    fn test_symbol_errors_name_the_symbol() {
        let missing = LoaderError::MissingMandatorySymbol {
            name: "avs_get_frame".to_string(),
        };
        assert!(missing.to_string().contains("avs_get_frame"));

        let unknown = LoaderError::UnknownRequiredSymbol {
            name: "avs_bogus".to_string(),
        };
        assert!(unknown.to_string().contains("avs_bogus"));

        let bootstrap = LoaderError::MissingBootstrapSymbol {
            name: "avs_at_exit".to_string(),
        };
        assert!(bootstrap.to_string().contains("avs_at_exit"));
    }
}
