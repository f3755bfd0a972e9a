//! FFI bindings for Mood Harmony
//!
//! C-compatible entry points for embedding the wheel and the charts in a host
//! UI. Strings are null-terminated UTF-8; every returned string is newly
//! allocated and must be released with `mh_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::DateTime;

use crate::config::WheelConfig;
use crate::geometry::angle_to_sector;
use crate::types::{MoodSample, Sector};
use crate::views::histogram::HistogramSpec;
use crate::wheel::{MoodWheel, PointerEvent, WheelNotification};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn notifications_to_cstr(notes: &[WheelNotification]) -> *mut c_char {
    match serde_json::to_string(notes) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&format!("Serialization error: {}", e));
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Sector index (0-7) for an angle in radians, counter-clockwise from +x.
#[no_mangle]
pub extern "C" fn mh_angle_to_sector(angle: f64) -> i32 {
    angle_to_sector(angle).index() as i32
}

/// Mood sample JSON (`{x, y, sector, angle}`) for an angle in radians.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `mh_free_string`.
#[no_mangle]
pub unsafe extern "C" fn mh_sample_json(angle: f64) -> *mut c_char {
    clear_last_error();
    match serde_json::to_string(&MoodSample::from_angle(angle)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&format!("Serialization error: {}", e));
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Wheel API
// ============================================================================

/// Opaque handle to a MoodWheel
pub struct MoodWheelHandle {
    wheel: MoodWheel,
}

/// Create a wheel on a square canvas of `size` pixels (<= 0 for the default).
///
/// # Safety
/// - Must be freed with `mh_wheel_free`.
#[no_mangle]
pub unsafe extern "C" fn mh_wheel_new(size: f64) -> *mut MoodWheelHandle {
    clear_last_error();

    let mut config = WheelConfig::default();
    if size.is_finite() && size > 0.0 {
        config.size = size;
    }
    Box::into_raw(Box::new(MoodWheelHandle {
        wheel: MoodWheel::from_config(&config),
    }))
}

/// Free a wheel.
///
/// # Safety
/// - `handle` must be a pointer returned by `mh_wheel_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mh_wheel_free(handle: *mut MoodWheelHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Feed one pointer event (JSON `{kind, x, y, at}`) to a wheel.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `mh_wheel_new`.
/// - `event_json` must be a valid null-terminated C string.
/// - Returns a JSON array of notifications that must be freed with `mh_free_string`.
/// - Returns NULL on error; call `mh_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mh_wheel_handle_event(
    handle: *mut MoodWheelHandle,
    event_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null wheel pointer");
        return ptr::null_mut();
    }
    let Some(json) = cstr_to_string(event_json) else {
        set_last_error("Invalid event string pointer");
        return ptr::null_mut();
    };
    let event: PointerEvent = match serde_json::from_str(&json) {
        Ok(event) => event,
        Err(e) => {
            set_last_error(&format!("Invalid pointer event: {}", e));
            return ptr::null_mut();
        }
    };

    let handle = &mut *handle;
    notifications_to_cstr(&handle.wheel.handle(&event))
}

/// Advance a wheel's clock to `unix_millis`, firing a due hover preview.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `mh_wheel_new`.
/// - Returns a JSON array that must be freed with `mh_free_string`, or NULL on error.
#[no_mangle]
pub unsafe extern "C" fn mh_wheel_tick(handle: *mut MoodWheelHandle, unix_millis: i64) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null wheel pointer");
        return ptr::null_mut();
    }
    let Some(now) = DateTime::from_timestamp_millis(unix_millis) else {
        set_last_error("Timestamp out of range");
        return ptr::null_mut();
    };
    let handle = &mut *handle;
    notifications_to_cstr(&handle.wheel.tick(now))
}

/// Committed sector of a wheel, or -1 for a NULL handle.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `mh_wheel_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn mh_wheel_committed(handle: *const MoodWheelHandle) -> i32 {
    if handle.is_null() {
        return -1;
    }
    (*handle).wheel.committed().index() as i32
}

/// Sync the committed sector without notifying. Returns 0 on success.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `mh_wheel_new`.
#[no_mangle]
pub unsafe extern "C" fn mh_wheel_set_highlighted(handle: *mut MoodWheelHandle, sector: i32) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null wheel pointer");
        return -1;
    }
    let sector = match u8::try_from(sector).map_err(|_| ()).and_then(|s| Sector::new(s).map_err(|_| ())) {
        Ok(sector) => sector,
        Err(()) => {
            set_last_error(&format!("Sector out of range: {}", sector));
            return -1;
        }
    };
    (*handle).wheel.set_highlighted(sector);
    0
}

// ============================================================================
// Charts
// ============================================================================

/// Render a histogram SVG.
///
/// `kind` is `"gain"` or `"bpm"`; `values_json` is a JSON array of numbers.
///
/// # Safety
/// - `kind` and `values_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `mh_free_string`.
/// - Returns NULL on error; call `mh_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mh_histogram_svg(kind: *const c_char, values_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let spec = match cstr_to_string(kind).as_deref() {
        Some("gain") => HistogramSpec::gain(),
        Some("bpm") => HistogramSpec::bpm(),
        Some(other) => {
            set_last_error(&format!("Unknown histogram kind: {}", other));
            return ptr::null_mut();
        }
        None => {
            set_last_error("Invalid kind string pointer");
            return ptr::null_mut();
        }
    };
    let Some(json) = cstr_to_string(values_json) else {
        set_last_error("Invalid values string pointer");
        return ptr::null_mut();
    };
    let values: Vec<serde_json::Value> = match serde_json::from_str(&json) {
        Ok(values) => values,
        Err(e) => {
            set_last_error(&format!("Invalid JSON: {}", e));
            return ptr::null_mut();
        }
    };
    let values: Vec<f64> = values.iter().filter_map(serde_json::Value::as_f64).collect();

    string_to_cstr(&spec.render(&values, false))
}

/// Free a string returned by a Mood Harmony function.
///
/// # Safety
/// - `ptr` must be a pointer returned by a Mood Harmony function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mh_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is valid until the next call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn mh_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn mh_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
