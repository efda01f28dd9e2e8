//! avsc-loader - runtime binder for the AviSynth+ C API
//!
//! A C-API plugin for AviSynth+ cannot link against the host at build time.
//! This crate opens the installed host library when the plugin is loaded,
//! checks that the host's interface version is new enough, and fills an
//! [`ApiTable`] with the host's entry points.
//!
//! The table is shared by every script environment in the process. Each
//! successful acquisition registers an exit hook with its environment; the
//! library is closed again when the last of those hooks has fired.
//!
//! ```ignore
//! use avsc_loader::{Requirements, InterfaceVersion};
//!
//! let requirements = Requirements::new(InterfaceVersion::new(8, 0))
//!     .require("avs_add_function");
//! let api = unsafe { avsc_loader::acquire(env, &requirements) }?;
//! ```

pub mod error;
pub mod global;
pub mod last_error;
pub mod library;
pub mod loader;
pub mod requirements;
pub mod version;

#[cfg(test)]
mod fake_host;

pub use avsc_api;
pub use avsc_api::{ApiTable, InterfaceVersion, SymbolDescriptor};
pub use error::LoaderError;
pub use global::{acquire, api, get_api, get_api_current, get_last_error, last_error, loader};
pub use last_error::{ERROR_CAPACITY, ErrorSlot, FALLBACK_ERROR};
pub use library::{HostLibrary, LIBRARY_NAME, LibraryProvider, SystemLibrary};
pub use loader::{ApiLoader, Phase};
pub use requirements::Requirements;
pub use version::{HostCapability, negotiate};

/// Version of this loader, independent of the host interface version
pub const LOADER_VERSION: &str = "1.1.0";
pub const LOADER_VERSION_MAJOR: u32 = 1;
pub const LOADER_VERSION_MINOR: u32 = 1;
pub const LOADER_VERSION_PATCH: u32 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_version_parts_match() {
        let joined = format!(
            "{}.{}.{}",
            LOADER_VERSION_MAJOR, LOADER_VERSION_MINOR, LOADER_VERSION_PATCH
        );
        assert_eq!(joined, LOADER_VERSION);
    }
}
