//! Declarative list of the host's exported entry points
//!
//! Append-only. Adding an entry point is one line here; resolution picks it
//! up without further changes.

use std::ffi::{c_char, c_int, c_uint, c_void};

use crate::table::declare_api;
use crate::types::{
    ApplyFunc, Clip, FilterInfo, Map, ScriptEnvironment, ShutdownFunc, Value, VideoFrame,
    VideoInfo,
};

declare_api! {
    // Loader bootstrap
    avs_check_version: fn(*mut ScriptEnvironment, c_int) -> c_int;
    avs_at_exit: fn(*mut ScriptEnvironment, ShutdownFunc, *mut c_void);
    avs_get_env_property: fn(*mut ScriptEnvironment, c_int) -> usize;

    // Script environment
    avs_create_script_environment: fn(c_int) -> *mut ScriptEnvironment;
    avs_delete_script_environment: fn(*mut ScriptEnvironment);
    avs_get_error: fn(*mut ScriptEnvironment) -> *const c_char;
    avs_get_cpu_flags: fn(*mut ScriptEnvironment) -> c_int;
    avs_save_string: fn(*mut ScriptEnvironment, *const c_char, c_int) -> *mut c_char;
    avs_add_function: fn(*mut ScriptEnvironment, *const c_char, *const c_char, ApplyFunc, *mut c_void) -> c_int;
    avs_function_exists: fn(*mut ScriptEnvironment, *const c_char) -> c_int;
    avs_invoke: fn(*mut ScriptEnvironment, *const c_char, Value, *const *const c_char) -> Value;
    avs_get_var: fn(*mut ScriptEnvironment, *const c_char) -> Value;
    avs_set_var: fn(*mut ScriptEnvironment, *const c_char, Value) -> c_int;
    avs_set_global_var: fn(*mut ScriptEnvironment, *const c_char, Value) -> c_int;
    avs_set_memory_max: fn(*mut ScriptEnvironment, c_int) -> c_int;
    avs_set_working_dir: fn(*mut ScriptEnvironment, *const c_char) -> c_int;
    avs_pool_allocate: fn(*mut ScriptEnvironment, usize, usize) -> *mut c_void;
    avs_pool_free: fn(*mut ScriptEnvironment, *mut c_void);
    avs_bit_blt: fn(*mut ScriptEnvironment, *mut u8, c_int, *const u8, c_int, c_int, c_int);

    // Values
    avs_take_clip: fn(Value, *mut ScriptEnvironment) -> *mut Clip;
    avs_set_to_clip: fn(*mut Value, *mut Clip);
    avs_copy_value: fn(*mut Value, Value);
    avs_release_value: fn(Value);

    // Clips
    avs_new_c_filter: fn(*mut ScriptEnvironment, *mut *mut FilterInfo, Value, c_int) -> *mut Clip;
    avs_release_clip: fn(*mut Clip);
    avs_copy_clip: fn(*mut Clip) -> *mut Clip;
    avs_clip_get_error: fn(*mut Clip) -> *const c_char;
    avs_get_version: fn(*mut Clip) -> c_int;
    avs_get_video_info: fn(*mut Clip) -> *const VideoInfo;
    avs_get_frame: fn(*mut Clip, c_int) -> *mut VideoFrame;
    avs_get_parity: fn(*mut Clip, c_int) -> c_int;
    avs_get_audio: fn(*mut Clip, *mut c_void, i64, i64) -> c_int;
    avs_set_cache_hints: fn(*mut Clip, c_int, c_int) -> c_int;

    // Video frames
    avs_new_video_frame_a: fn(*mut ScriptEnvironment, *const VideoInfo, c_int) -> *mut VideoFrame;
    avs_new_video_frame_p: fn(*mut ScriptEnvironment, *const VideoInfo, *const VideoFrame) -> *mut VideoFrame;
    avs_new_video_frame_p_a: fn(*mut ScriptEnvironment, *const VideoInfo, *const VideoFrame, c_int) -> *mut VideoFrame;
    avs_subframe: fn(*mut ScriptEnvironment, *mut VideoFrame, c_int, c_int, c_int, c_int) -> *mut VideoFrame;
    avs_make_writable: fn(*mut ScriptEnvironment, *mut *mut VideoFrame) -> c_int;
    avs_release_video_frame: fn(*mut VideoFrame);
    avs_copy_video_frame: fn(*mut VideoFrame) -> *mut VideoFrame;
    avs_is_writable: fn(*const VideoFrame) -> c_int;
    avs_get_pitch_p: fn(*const VideoFrame, c_int) -> c_int;
    avs_get_row_size_p: fn(*const VideoFrame, c_int) -> c_int;
    avs_get_height_p: fn(*const VideoFrame, c_int) -> c_int;
    avs_get_read_ptr_p: fn(*const VideoFrame, c_int) -> *const u8;
    avs_get_write_ptr_p: fn(*const VideoFrame, c_int) -> *mut u8;
    avs_video_frame_get_pixel_type: fn(*const VideoFrame) -> c_int;
    avs_video_frame_amend_pixel_type: fn(*mut VideoFrame, c_int);

    // Video info queries (interface 8+)
    avs_is_rgb48: fn(*const VideoInfo) -> c_int;
    avs_is_rgb64: fn(*const VideoInfo) -> c_int;
    avs_is_yuv444p16: fn(*const VideoInfo) -> c_int;
    avs_is_444: fn(*const VideoInfo) -> c_int;
    avs_is_422: fn(*const VideoInfo) -> c_int;
    avs_is_420: fn(*const VideoInfo) -> c_int;
    avs_is_y: fn(*const VideoInfo) -> c_int;
    avs_is_yuva: fn(*const VideoInfo) -> c_int;
    avs_is_planar_rgb: fn(*const VideoInfo) -> c_int;
    avs_is_planar_rgba: fn(*const VideoInfo) -> c_int;
    avs_num_components: fn(*const VideoInfo) -> c_int;
    avs_component_size: fn(*const VideoInfo) -> c_int;
    avs_bits_per_component: fn(*const VideoInfo) -> c_int;
    avs_is_channel_mask_known: fn(*const VideoInfo) -> c_int;
    avs_set_channel_mask: fn(*const VideoInfo, bool, c_uint);
    avs_get_channel_mask: fn(*const VideoInfo) -> c_uint;

    // Frame properties (interface 8+)
    avs_get_frame_props_ro: fn(*mut ScriptEnvironment, *const VideoFrame) -> *const Map;
    avs_get_frame_props_rw: fn(*mut ScriptEnvironment, *mut VideoFrame) -> *mut Map;
    avs_is_property_writable: fn(*mut ScriptEnvironment, *const VideoFrame) -> c_int;
    avs_make_property_writable: fn(*mut ScriptEnvironment, *mut *mut VideoFrame);
    avs_prop_num_keys: fn(*mut ScriptEnvironment, *const Map) -> c_int;
    avs_prop_get_key: fn(*mut ScriptEnvironment, *const Map, c_int) -> *const c_char;
    avs_prop_num_elements: fn(*mut ScriptEnvironment, *const Map, *const c_char) -> c_int;
    avs_prop_get_type: fn(*mut ScriptEnvironment, *const Map, *const c_char) -> c_char;
    avs_prop_get_int: fn(*mut ScriptEnvironment, *const Map, *const c_char, c_int, *mut c_int) -> i64;
    avs_prop_get_float: fn(*mut ScriptEnvironment, *const Map, *const c_char, c_int, *mut c_int) -> f64;
    avs_prop_get_data: fn(*mut ScriptEnvironment, *const Map, *const c_char, c_int, *mut c_int) -> *const c_char;
    avs_prop_get_data_size: fn(*mut ScriptEnvironment, *const Map, *const c_char, c_int, *mut c_int) -> c_int;
    avs_prop_get_clip: fn(*mut ScriptEnvironment, *const Map, *const c_char, c_int, *mut c_int) -> *mut Clip;
    avs_prop_get_frame: fn(*mut ScriptEnvironment, *const Map, *const c_char, c_int, *mut c_int) -> *const VideoFrame;
    avs_prop_get_int_array: fn(*mut ScriptEnvironment, *const Map, *const c_char, *mut c_int) -> *const i64;
    avs_prop_get_float_array: fn(*mut ScriptEnvironment, *const Map, *const c_char, *mut c_int) -> *const f64;
    avs_prop_delete_key: fn(*mut ScriptEnvironment, *mut Map, *const c_char) -> c_int;
    avs_prop_set_int: fn(*mut ScriptEnvironment, *mut Map, *const c_char, i64, c_int) -> c_int;
    avs_prop_set_float: fn(*mut ScriptEnvironment, *mut Map, *const c_char, f64, c_int) -> c_int;
    avs_prop_set_data: fn(*mut ScriptEnvironment, *mut Map, *const c_char, *const c_char, c_int, c_int) -> c_int;
    avs_prop_set_clip: fn(*mut ScriptEnvironment, *mut Map, *const c_char, *mut Clip, c_int) -> c_int;
    avs_prop_set_frame: fn(*mut ScriptEnvironment, *mut Map, *const c_char, *const VideoFrame, c_int) -> c_int;
    avs_prop_set_int_array: fn(*mut ScriptEnvironment, *mut Map, *const c_char, *const i64, c_int) -> c_int;
    avs_prop_set_float_array: fn(*mut ScriptEnvironment, *mut Map, *const c_char, *const f64, c_int) -> c_int;
    avs_clear_map: fn(*mut ScriptEnvironment, *mut Map);
}
