//! C ABI entry points for native callers.
//!
//! A native consumer uses these to derive the record layout at runtime
//! instead of hard-coding it, and to hand back strings that Rust allocated.

use std::ffi::c_char;
use std::ptr;
use std::sync::OnceLock;

use crate::codec::RecordCodec;
use crate::config::BoundaryConfig;
use crate::layout::{FIELD_COUNT, Field};
use crate::native::{GameInfoNative, NATIVE_LAYOUT, NATIVE_SIZE, OwnedGameInfo, StringPolicy};

pub const GAMEINFO_OK: i32 = 0;
pub const GAMEINFO_ERR_NULL_POINTER: i32 = -1;
pub const GAMEINFO_ERR_DECODE: i32 = -2;
pub const GAMEINFO_ERR_STRING: i32 = -3;

/// Configuration for the exported entry points, loaded on first use.
fn boundary_config() -> &'static BoundaryConfig {
    static CONFIG: OnceLock<BoundaryConfig> = OnceLock::new();
    CONFIG.get_or_init(BoundaryConfig::load)
}

#[unsafe(no_mangle)]
pub extern "C" fn gameinfo_field_count() -> usize {
    FIELD_COUNT
}

/// Static NUL-terminated field name, or null when `index` is out of range.
#[unsafe(no_mangle)]
pub extern "C" fn gameinfo_field_name(index: usize) -> *const c_char {
    Field::from_index(index).map_or(ptr::null(), |field| field.c_name().as_ptr())
}

/// Byte offset of the field inside `GameInfoNative`, or -1.
#[unsafe(no_mangle)]
pub extern "C" fn gameinfo_field_offset(index: usize) -> isize {
    NATIVE_LAYOUT
        .get(index)
        .map_or(-1, |layout| layout.offset as isize)
}

#[unsafe(no_mangle)]
pub extern "C" fn gameinfo_native_size() -> usize {
    NATIVE_SIZE
}

/// Write an empty record (zero size, null strings) into caller memory.
///
/// # Safety
///
/// `out` must be null or valid for writes of one `GameInfoNative`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gameinfo_init(out: *mut GameInfoNative) {
    if out.is_null() {
        return;
    }
    // SAFETY: non-null and writable per the contract above.
    unsafe { out.write(GameInfoNative::empty()) };
}

/// Free the strings inside a record populated by this library.
///
/// # Safety
///
/// `info` must be null or point to a `GameInfoNative` whose non-null strings
/// were allocated by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gameinfo_release(info: *mut GameInfoNative) {
    // SAFETY: null is handled by `as_mut`; the rest is upheld by the caller.
    if let Some(info) = unsafe { info.as_mut() } {
        unsafe { info.release() };
    }
}

/// Decode a wire-format record into caller memory, using the size limit from
/// `gameinfo.toml` and `GAMEINFO_*` overrides.
///
/// On success any strings already in `out` are freed, and `out` then owns
/// newly allocated strings that must be freed with [`gameinfo_release`]. On
/// failure `out` is left untouched.
///
/// # Safety
///
/// `data` must be valid for reads of `len` bytes. `out` must point to an
/// initialized `GameInfoNative` (from [`gameinfo_init`] or an earlier decode)
/// whose non-null strings were allocated by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gameinfo_decode(
    data: *const u8,
    len: usize,
    out: *mut GameInfoNative,
) -> i32 {
    if data.is_null() || out.is_null() {
        return GAMEINFO_ERR_NULL_POINTER;
    }
    // SAFETY: upheld by the caller.
    let (bytes, out) = unsafe { (std::slice::from_raw_parts(data, len), &mut *out) };
    // SAFETY: `out` is initialized and its strings are ours, per the contract above.
    unsafe { decode_into(bytes, out, &RecordCodec::from_config(boundary_config())) }
}

/// # Safety
///
/// Non-null strings in `out` must have been allocated by this library.
unsafe fn decode_into(bytes: &[u8], out: &mut GameInfoNative, codec: &RecordCodec) -> i32 {
    let record = match codec.decode(bytes) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(error = %e, "native decode of game metadata record failed");
            return GAMEINFO_ERR_DECODE;
        },
    };
    let owned = match OwnedGameInfo::from_record(&record) {
        Ok(owned) => owned,
        Err(e) => {
            tracing::warn!(error = %e, "decoded record cannot be passed to native side");
            return GAMEINFO_ERR_STRING;
        },
    };
    // SAFETY: upheld by the caller.
    unsafe { out.release() };
    *out = owned.into_native();
    GAMEINFO_OK
}

/// Read a native record and check its strings are acceptable under the
/// configured string policy. Returns `GAMEINFO_OK` or `GAMEINFO_ERR_STRING`.
///
/// # Safety
///
/// `info` must be null or point to a `GameInfoNative` whose non-null strings
/// are NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gameinfo_validate_strings(info: *const GameInfoNative) -> i32 {
    // SAFETY: null is handled by `as_ref`; the rest is upheld by the caller.
    let Some(info) = (unsafe { info.as_ref() }) else {
        return GAMEINFO_ERR_NULL_POINTER;
    };
    // SAFETY: upheld by the caller.
    unsafe { validate_with(info, boundary_config().native.string_policy) }
}

/// # Safety
///
/// Non-null strings in `info` must be NUL-terminated.
unsafe fn validate_with(info: &GameInfoNative, policy: StringPolicy) -> i32 {
    // SAFETY: upheld by the caller.
    match unsafe { info.to_record(policy) } {
        Ok(_) => GAMEINFO_OK,
        Err(e) => {
            tracing::debug!(error = %e, "native record failed string validation");
            GAMEINFO_ERR_STRING
        },
    }
}
