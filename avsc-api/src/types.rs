//! ABI types shared with the host
//!
//! Handles the host only ever passes by pointer are declared as opaque
//! zero-sized types, so they cannot be constructed or moved from Rust.

use std::ffi::{c_char, c_double, c_float, c_int, c_short, c_uint, c_void};
use std::marker::{PhantomData, PhantomPinned};

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(C)]
        pub struct $name {
            _private: [u8; 0],
            _marker: PhantomData<(*mut u8, PhantomPinned)>,
        }
    };
}

opaque_handle!(
    /// A host script environment (`AVS_ScriptEnvironment`)
    ScriptEnvironment
);
opaque_handle!(
    /// A clip handle (`AVS_Clip`)
    Clip
);
opaque_handle!(
    /// A reference-counted video frame (`AVS_VideoFrame`)
    VideoFrame
);
opaque_handle!(
    /// Filter state handed out by `avs_new_c_filter` (`AVS_FilterInfo`)
    FilterInfo
);
opaque_handle!(
    /// A frame property map (`AVS_Map`)
    Map
);

/// Stream description of a clip (`AVS_VideoInfo`)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoInfo {
    pub width: c_int,
    pub height: c_int,
    pub fps_numerator: c_uint,
    pub fps_denominator: c_uint,
    pub num_frames: c_int,
    pub pixel_type: c_int,
    pub audio_samples_per_second: c_int,
    pub sample_type: c_int,
    pub num_audio_samples: i64,
    pub nchannels: c_int,
    pub image_type: c_int,
}

/// Tagged script value (`AVS_Value`)
///
/// `type_` holds the ASCII tag: `a`rray, `c`lip, `b`ool, `i`nt, `f`loat,
/// `s`tring, `v`oid, `l`ong, `d`ouble or `e`rror.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Value {
    pub type_: c_short,
    pub array_size: c_short,
    pub d: ValueData,
}

/// Payload of a [`Value`]
#[repr(C)]
#[derive(Clone, Copy)]
pub union ValueData {
    pub clip: *mut c_void,
    pub boolean: c_char,
    pub integer: c_int,
    pub floating_pt: c_float,
    pub string: *const c_char,
    pub array: *const Value,
    pub function: *mut c_void,
    pub longlong: i64,
    pub double_pt: c_double,
}

impl Value {
    /// The undefined value (`avs_void`)
    pub const VOID: Value = Value {
        type_: b'v' as c_short,
        array_size: 0,
        d: ValueData { longlong: 0 },
    };
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("type", &(self.type_ as u8 as char))
            .field("array_size", &self.array_size)
            .finish_non_exhaustive()
    }
}

/// Callback registered through `avs_at_exit`, invoked at environment teardown
pub type ShutdownFunc = unsafe extern "system" fn(user_data: *mut c_void, env: *mut ScriptEnvironment);

/// Script function implementation registered through `avs_add_function`
pub type ApplyFunc =
    unsafe extern "system" fn(env: *mut ScriptEnvironment, args: Value, user_data: *mut c_void) -> Value;

// Properties accepted by `avs_get_env_property`.
pub const AEP_PHYSICAL_CPUS: c_int = 1;
pub const AEP_LOGICAL_CPUS: c_int = 2;
pub const AEP_THREADPOOL_THREADS: c_int = 3;
pub const AEP_FILTERCHAIN_THREADS: c_int = 4;
pub const AEP_THREAD_ID: c_int = 5;
pub const AEP_VERSION: c_int = 6;
pub const AEP_HOST_SYSTEM_ENDIANNESS: c_int = 7;
pub const AEP_INTERFACE_VERSION: c_int = 8;
pub const AEP_INTERFACE_BUGFIX: c_int = 9;
