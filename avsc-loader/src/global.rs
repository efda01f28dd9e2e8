//! Process-wide loader and the C-style entry points
//!
//! A plugin links one copy of this crate, so one loader per plugin binary.
//! Every environment that loads the plugin acquires through it.

use std::ffi::c_char;
use std::sync::{Arc, LazyLock};

use avsc_api::{ApiTable, InterfaceVersion, ScriptEnvironment};

use crate::error::LoaderError;
use crate::loader::ApiLoader;
use crate::requirements::Requirements;

static LOADER: LazyLock<Arc<ApiLoader>> = LazyLock::new(|| Arc::new(ApiLoader::default()));

/// The process-wide loader
pub fn loader() -> &'static Arc<ApiLoader> {
    &LOADER
}

/// Acquire the host API through the process-wide loader.
///
/// # Safety
///
/// See [`ApiLoader::acquire`].
pub unsafe fn acquire(
    env: *mut ScriptEnvironment,
    requirements: &Requirements,
) -> Result<&'static ApiTable, LoaderError> {
    unsafe { LOADER.acquire(env, requirements) }
}

/// Acquire the host API, reporting failure as `None`.
///
/// The reason for a `None` is available from [`get_last_error`].
///
/// # Safety
///
/// See [`ApiLoader::acquire`].
pub unsafe fn get_api(
    env: *mut ScriptEnvironment,
    major: i32,
    bugfix: i32,
    required: &[&str],
) -> Option<&'static ApiTable> {
    let requirements = Requirements::with_symbols(major, bugfix, required.iter().copied());
    unsafe { acquire(env, &requirements) }.ok()
}

/// Acquire with the interface version this crate was built against
///
/// # Safety
///
/// See [`ApiLoader::acquire`].
pub unsafe fn get_api_current(env: *mut ScriptEnvironment, required: &[&str]) -> Option<&'static ApiTable> {
    let InterfaceVersion { major, bugfix } = InterfaceVersion::CURRENT;
    unsafe { get_api(env, major, bugfix, required) }
}

/// NUL-terminated description of the most recent failed acquisition.
///
/// Valid until the next failure or first-time success. Never null.
pub fn get_last_error() -> *const c_char {
    LOADER.error_slot().as_ptr()
}

/// Owned copy of [`get_last_error`]
pub fn last_error() -> String {
    LOADER.last_error()
}

/// The published table, if some environment currently holds it
pub fn api() -> Option<&'static ApiTable> {
    LOADER.published()
}

/// Define the `avisynth_c_plugin_init` export the host calls when it loads
/// the plugin.
///
/// The export acquires the API through the process-wide loader, requesting
/// [`InterfaceVersion::CURRENT`] (or the given `version = (major, bugfix)`)
/// and the listed mandatory entry points, then hands the table to `$init`.
/// `$init` is an `unsafe fn(&'static ApiTable, *mut ScriptEnvironment) -> *const c_char`
/// that registers the plugin's functions and returns its name.
///
/// When the acquisition fails the loader's error text is returned to the
/// host instead. A panic in `$init` is caught at the boundary.
///
/// ```ignore
/// unsafe fn init(api: &'static ApiTable, env: *mut ScriptEnvironment) -> *const c_char {
///     // api.avs_add_function() ...
///     c"MyFilter".as_ptr()
/// }
///
/// avsc_loader::avisynth_c_plugin!(init, "avs_add_function");
/// ```
#[macro_export]
macro_rules! avisynth_c_plugin {
    (version = ($major:expr, $bugfix:expr), $init:path $(, $name:literal)* $(,)?) => {
        #[unsafe(no_mangle)]
        pub unsafe extern "system" fn avisynth_c_plugin_init(
            env: *mut $crate::avsc_api::ScriptEnvironment,
        ) -> *const ::std::ffi::c_char {
            let result = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| unsafe {
                match $crate::get_api(env, $major, $bugfix, &[$($name),*]) {
                    Some(api) => $init(api, env),
                    None => $crate::get_last_error(),
                }
            }));
            match result {
                Ok(message) => message,
                Err(_) => c"Plugin initialization panicked".as_ptr(),
            }
        }
    };
    ($init:path $(, $name:literal)* $(,)?) => {
        $crate::avisynth_c_plugin!(
            version = (
                $crate::avsc_api::INTERFACE_VERSION,
                $crate::avsc_api::INTERFACE_BUGFIX_VERSION
            ),
            $init $(, $name)*
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::ffi::CStr;

    #[test]
    #[serial]
    fn test_get_api_unknown_name_fails_before_host() {
        let table = unsafe { get_api(std::ptr::null_mut(), 3, 0, &["avs_does_not_exist"]) };
        assert!(table.is_none());
        assert!(last_error().contains("avs_does_not_exist"));
        let text = unsafe { CStr::from_ptr(get_last_error()) };
        assert!(text.to_str().unwrap().contains("unknown function"));
        assert_eq!(loader().ref_count(), 0);
    }

    #[test]
    #[serial]
    fn test_nothing_published_without_acquisition() {
        assert!(api().is_none());
        assert!(!get_last_error().is_null());
    }

    mod plugin {
        use std::ffi::{CStr, c_char};

        use serial_test::serial;

        use crate::avsc_api::{ApiTable, ScriptEnvironment};

        unsafe fn init(_api: &'static ApiTable, _env: *mut ScriptEnvironment) -> *const c_char {
            c"FakePlugin".as_ptr()
        }

        crate::avisynth_c_plugin!(init, "avs_get_frame", "avs_not_exported_anywhere");

        #[test]
        #[serial]
        fn test_plugin_init_reports_acquisition_failure() {
            let message = unsafe { CStr::from_ptr(avisynth_c_plugin_init(std::ptr::null_mut())) };
            let message = message.to_str().unwrap();
            assert!(message.contains("avs_not_exported_anywhere"));
            assert_eq!(message, crate::last_error());
        }
    }
}
