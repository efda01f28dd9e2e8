//! Last-error slot for the C-style error query

use std::ffi::{CStr, CString, c_char};
use std::fmt::Display;
use std::sync::{Mutex, PoisonError};

/// Maximum stored message size in bytes, including the NUL terminator
pub const ERROR_CAPACITY: usize = 300;

/// Returned when no failure has been recorded
pub const FALLBACK_ERROR: &CStr = c"Unknown AviSynth C API loading error.";

/// Holds the most recent failure description.
///
/// Each recorded failure replaces the previous one. Pointers handed out by
/// [`ErrorSlot::as_ptr`] stay valid until the next [`ErrorSlot::record`] or
/// [`ErrorSlot::clear`].
#[derive(Debug, Default)]
pub struct ErrorSlot {
    message: Mutex<Option<CString>>,
}

impl ErrorSlot {
    pub const fn new() -> Self {
        Self {
            message: Mutex::new(None),
        }
    }

    /// Overwrite the slot with `error`, truncated to fit [`ERROR_CAPACITY`]
    pub fn record(&self, error: impl Display) {
        let stored = bounded(&error.to_string());
        *self.message.lock().unwrap_or_else(PoisonError::into_inner) = Some(stored);
    }

    /// Forget the recorded failure; readers see the fallback text again
    pub fn clear(&self) {
        *self.message.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Owned copy of the current message, or the fallback text
    pub fn message(&self) -> String {
        let guard = self.message.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_deref()
            .unwrap_or(FALLBACK_ERROR)
            .to_string_lossy()
            .into_owned()
    }

    /// NUL-terminated view of the current message for C callers.
    ///
    /// The pointer is invalidated by the next `record` or `clear` on this slot.
    pub fn as_ptr(&self) -> *const c_char {
        let guard = self.message.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_deref() {
            Some(message) => message.as_ptr(),
            None => FALLBACK_ERROR.as_ptr(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

fn bounded(text: &str) -> CString {
    let mut end = text.len().min(ERROR_CAPACITY - 1);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let bytes: Vec<u8> = text.as_bytes()[..end]
        .iter()
        .copied()
        .filter(|&b| b != 0)
        .collect();
    CString::new(bytes).unwrap_or_else(|_| FALLBACK_ERROR.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_returns_fallback() {
        let slot = ErrorSlot::new();
        assert!(slot.is_empty());
        assert_eq!(slot.message(), "Unknown AviSynth C API loading error.");
        let text = unsafe { CStr::from_ptr(slot.as_ptr()) };
        assert_eq!(text, FALLBACK_ERROR);
    }

    #[test]
    fn test_record_overwrites() {
        let slot = ErrorSlot::new();
        slot.record("first");
        slot.record("second");
        assert_eq!(slot.message(), "second");
        let text = unsafe { CStr::from_ptr(slot.as_ptr()) };
        assert_eq!(text.to_str().unwrap(), "second");
    }

    #[test]
    fn test_clear_restores_fallback() {
        let slot = ErrorSlot::new();
        slot.record("failed");
        slot.clear();
        assert!(slot.is_empty());
        assert_eq!(slot.message(), "Unknown AviSynth C API loading error.");
    }

    #[test]
    fn test_long_message_is_truncated() {
        let slot = ErrorSlot::new();
        slot.record("x".repeat(1000));
        assert_eq!(slot.message().len(), ERROR_CAPACITY - 1);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let slot = ErrorSlot::new();
        // 'é' is two bytes, so the cut lands mid-character at 299
        slot.record("é".repeat(200));
        let message = slot.message();
        assert!(message.len() < ERROR_CAPACITY);
        assert!(message.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_interior_nul_is_dropped() {
        let slot = ErrorSlot::new();
        slot.record("bad\0name");
        assert_eq!(slot.message(), "badname");
    }
}
