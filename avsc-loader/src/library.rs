//! Platform library shim
//!
//! Opening the host library and looking up exports sit behind two small
//! traits so the loader can be driven by something other than the installed
//! host. Closing a library is dropping it.

use std::ffi::c_void;

use avsc_api::SymbolAddress;
use libloading::Library;

use crate::error::LoaderError;

/// Canonical file name of the host library on this platform
#[cfg(windows)]
pub const LIBRARY_NAME: &str = "avisynth.dll";
#[cfg(target_os = "macos")]
pub const LIBRARY_NAME: &str = "libavisynth.dylib";
#[cfg(all(unix, not(target_os = "macos")))]
pub const LIBRARY_NAME: &str = "libavisynth.so";

/// An open host library
pub trait HostLibrary: Send + Sync {
    /// Address of the named export, or `None` if it is absent
    fn resolve(&self, name: &str) -> Option<SymbolAddress>;
}

/// Opens the host library. One attempt per call, no retries.
pub trait LibraryProvider: Send + Sync + 'static {
    /// File name used in diagnostics
    fn library_name(&self) -> &str;

    /// Open the library; failure leaves nothing behind
    fn open(&self) -> Result<Box<dyn HostLibrary>, LoaderError>;
}

/// The installed host library, opened by its canonical name
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLibrary;

impl LibraryProvider for SystemLibrary {
    fn library_name(&self) -> &str {
        LIBRARY_NAME
    }

    fn open(&self) -> Result<Box<dyn HostLibrary>, LoaderError> {
        // SAFETY: the host library's initializers are run by the host itself
        // before any plugin is loaded; opening it again only bumps its refcount.
        let library = unsafe { open_host_library() }.map_err(|e| LoaderError::LibraryNotFound {
            library: LIBRARY_NAME.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(library = LIBRARY_NAME, "Opened host library");
        Ok(Box::new(SystemHostLibrary { library }))
    }
}

#[cfg(unix)]
unsafe fn open_host_library() -> Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_LAZY, RTLD_LOCAL};

    let library = unsafe { UnixLibrary::open(Some(LIBRARY_NAME), RTLD_LAZY | RTLD_LOCAL)? };
    Ok(library.into())
}

#[cfg(windows)]
unsafe fn open_host_library() -> Result<Library, libloading::Error> {
    unsafe { Library::new(LIBRARY_NAME) }
}

struct SystemHostLibrary {
    library: Library,
}

impl HostLibrary for SystemHostLibrary {
    fn resolve(&self, name: &str) -> Option<SymbolAddress> {
        // SAFETY: the symbol is only read as an address, never called here.
        let symbol = unsafe { self.library.get::<*mut c_void>(name.as_bytes()) }.ok()?;
        // SAFETY: the address comes from this library under `name`.
        unsafe { SymbolAddress::from_raw(*symbol) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_name_matches_platform() {
        let provider = SystemLibrary;
        if cfg!(windows) {
            assert_eq!(provider.library_name(), "avisynth.dll");
        } else if cfg!(target_os = "macos") {
            assert_eq!(provider.library_name(), "libavisynth.dylib");
        } else {
            assert_eq!(provider.library_name(), "libavisynth.so");
        }
    }

    #[test]
    fn test_open_failure_is_library_not_found() {
        // Only meaningful where the host is not installed.
        if let Err(err) = SystemLibrary.open() {
            assert!(matches!(err, LoaderError::LibraryNotFound { .. }));
            assert!(err.to_string().contains(LIBRARY_NAME));
        }
    }
}
