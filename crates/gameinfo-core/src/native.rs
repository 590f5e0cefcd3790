//! `#[repr(C)]` mirror of [`GameMetadataRecord`] for native callers.
//!
//! The struct is the memory layout both sides allocate and read: one `f64`
//! followed by five NUL-terminated string pointers, in [`FIELD_ORDER`]. A null
//! pointer means the string is absent.

use std::ffi::{CStr, CString, c_char};
use std::mem::{offset_of, size_of};
use std::ptr;

use serde::{Deserialize, Serialize};

use crate::layout::{FIELD_COUNT, FIELD_ORDER, Field, FieldKind};
use crate::record::GameMetadataRecord;

/// Native memory layout of a game metadata record.
#[repr(C)]
#[derive(Debug)]
pub struct GameInfoNative {
    pub file_size: f64,
    pub title_name: *mut c_char,
    pub title_id: *mut c_char,
    pub developer: *mut c_char,
    pub version: *mut c_char,
    pub icon: *mut c_char,
}

/// Offset and size of one field inside [`GameInfoNative`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub field: Field,
    pub offset: usize,
    pub size: usize,
}

/// Byte layout of [`GameInfoNative`], in field order.
pub const NATIVE_LAYOUT: [FieldLayout; FIELD_COUNT] = [
    FieldLayout {
        field: Field::FileSize,
        offset: offset_of!(GameInfoNative, file_size),
        size: size_of::<f64>(),
    },
    FieldLayout {
        field: Field::TitleName,
        offset: offset_of!(GameInfoNative, title_name),
        size: size_of::<*mut c_char>(),
    },
    FieldLayout {
        field: Field::TitleId,
        offset: offset_of!(GameInfoNative, title_id),
        size: size_of::<*mut c_char>(),
    },
    FieldLayout {
        field: Field::Developer,
        offset: offset_of!(GameInfoNative, developer),
        size: size_of::<*mut c_char>(),
    },
    FieldLayout {
        field: Field::Version,
        offset: offset_of!(GameInfoNative, version),
        size: size_of::<*mut c_char>(),
    },
    FieldLayout {
        field: Field::Icon,
        offset: offset_of!(GameInfoNative, icon),
        size: size_of::<*mut c_char>(),
    },
];

/// Total size of [`GameInfoNative`] in bytes.
pub const NATIVE_SIZE: usize = size_of::<GameInfoNative>();

// Layout entries must follow FIELD_ORDER with strictly increasing,
// non-overlapping offsets.
const _: () = {
    let mut i = 0;
    while i < FIELD_COUNT {
        assert!(NATIVE_LAYOUT[i].field as usize == FIELD_ORDER[i] as usize);
        if i > 0 {
            let prev = NATIVE_LAYOUT[i - 1];
            assert!(NATIVE_LAYOUT[i].offset >= prev.offset + prev.size);
        }
        i += 1;
    }
    assert!(NATIVE_LAYOUT[0].offset == 0);
    let last = NATIVE_LAYOUT[FIELD_COUNT - 1];
    assert!(last.offset + last.size <= NATIVE_SIZE);
};

/// How to handle native strings that are not valid UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringPolicy {
    /// Reject with [`BoundaryError::InvalidUtf8`].
    #[default]
    Strict,
    /// Replace invalid sequences with U+FFFD.
    Lossy,
}

impl std::str::FromStr for StringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lossy" => Ok(Self::Lossy),
            other => Err(format!("unknown string policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// A string contains a NUL byte and cannot be passed as a C string.
    InteriorNul { field: Field },
    /// A native string is not valid UTF-8.
    InvalidUtf8 { field: Field },
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InteriorNul { field } => write!(f, "{field} contains an interior NUL byte"),
            Self::InvalidUtf8 { field } => write!(f, "{field} is not valid UTF-8"),
        }
    }
}

impl std::error::Error for BoundaryError {}

impl Default for GameInfoNative {
    fn default() -> Self {
        Self::empty()
    }
}

impl GameInfoNative {
    /// Zero file size and null string pointers.
    pub const fn empty() -> Self {
        Self {
            file_size: 0.0,
            title_name: ptr::null_mut(),
            title_id: ptr::null_mut(),
            developer: ptr::null_mut(),
            version: ptr::null_mut(),
            icon: ptr::null_mut(),
        }
    }

    fn text_slot(&self, field: Field) -> Option<*mut c_char> {
        match field {
            Field::FileSize => None,
            Field::TitleName => Some(self.title_name),
            Field::TitleId => Some(self.title_id),
            Field::Developer => Some(self.developer),
            Field::Version => Some(self.version),
            Field::Icon => Some(self.icon),
        }
    }

    fn text_slot_mut(&mut self, field: Field) -> Option<&mut *mut c_char> {
        match field {
            Field::FileSize => None,
            Field::TitleName => Some(&mut self.title_name),
            Field::TitleId => Some(&mut self.title_id),
            Field::Developer => Some(&mut self.developer),
            Field::Version => Some(&mut self.version),
            Field::Icon => Some(&mut self.icon),
        }
    }

    /// Read a populated struct back into a record.
    ///
    /// # Safety
    ///
    /// Every non-null string pointer must point to a NUL-terminated buffer
    /// that stays valid for the duration of the call.
    pub unsafe fn to_record(
        &self,
        policy: StringPolicy,
    ) -> Result<GameMetadataRecord, BoundaryError> {
        let mut record = GameMetadataRecord::new();
        record.file_size = self.file_size;
        for field in FIELD_ORDER.iter().filter(|f| f.kind() == FieldKind::Text) {
            let Some(raw) = self.text_slot(*field) else {
                continue;
            };
            // SAFETY: upheld by the caller.
            let value = unsafe { read_c_string(raw, *field, policy) }?;
            match field {
                Field::TitleName => record.title_name = value,
                Field::TitleId => record.title_id = value,
                Field::Developer => record.developer = value,
                Field::Version => record.version = value,
                Field::Icon => record.icon = value,
                Field::FileSize => {},
            }
        }
        Ok(record)
    }

    /// Free every string and reset the pointers to null. A second call is a no-op.
    ///
    /// # Safety
    ///
    /// Every non-null string pointer must have been produced by
    /// [`OwnedGameInfo::from_record`] in this library and not freed elsewhere.
    pub unsafe fn release(&mut self) {
        for field in FIELD_ORDER {
            if let Some(slot) = self.text_slot_mut(field) {
                let raw = std::mem::replace(slot, ptr::null_mut());
                if !raw.is_null() {
                    // SAFETY: allocated by `CString::into_raw`, per the contract above.
                    drop(unsafe { CString::from_raw(raw) });
                }
            }
        }
    }
}

/// A [`GameInfoNative`] whose strings were allocated by Rust, freed on drop.
#[derive(Debug)]
pub struct OwnedGameInfo {
    inner: GameInfoNative,
}

impl OwnedGameInfo {
    /// Allocate C strings for every present field.
    pub fn from_record(record: &GameMetadataRecord) -> Result<Self, BoundaryError> {
        let mut owned = Self {
            inner: GameInfoNative::empty(),
        };
        owned.inner.file_size = record.file_size;
        for (field, value) in [
            (Field::TitleName, &record.title_name),
            (Field::TitleId, &record.title_id),
            (Field::Developer, &record.developer),
            (Field::Version, &record.version),
            (Field::Icon, &record.icon),
        ] {
            let Some(text) = value else {
                continue;
            };
            // On error `owned` drops and frees what was already allocated.
            let c_string = CString::new(text.as_str()).map_err(|_| {
                tracing::warn!(field = %field, "cannot pass string with interior NUL to native side");
                BoundaryError::InteriorNul { field }
            })?;
            if let Some(slot) = owned.inner.text_slot_mut(field) {
                *slot = c_string.into_raw();
            }
        }
        Ok(owned)
    }

    pub fn as_native(&self) -> &GameInfoNative {
        &self.inner
    }

    /// Pointer for passing to a native reader. Valid while `self` is alive.
    pub fn as_ptr(&self) -> *const GameInfoNative {
        &self.inner
    }

    /// Give up ownership. The receiver must eventually call
    /// [`GameInfoNative::release`] (or `gameinfo_release`).
    pub fn into_native(self) -> GameInfoNative {
        let mut this = std::mem::ManuallyDrop::new(self);
        std::mem::take(&mut this.inner)
    }

    pub fn to_record(&self, policy: StringPolicy) -> Result<GameMetadataRecord, BoundaryError> {
        // SAFETY: every pointer is either null or a live CString owned by self.
        unsafe { self.inner.to_record(policy) }
    }
}

impl Drop for OwnedGameInfo {
    fn drop(&mut self) {
        // SAFETY: strings were allocated by `from_record`.
        unsafe { self.inner.release() }
    }
}

/// # Safety
///
/// `raw` must be null or point to a live NUL-terminated buffer.
unsafe fn read_c_string(
    raw: *const c_char,
    field: Field,
    policy: StringPolicy,
) -> Result<Option<String>, BoundaryError> {
    if raw.is_null() {
        return Ok(None);
    }
    // SAFETY: upheld by the caller.
    let c_str = unsafe { CStr::from_ptr(raw) };
    match (c_str.to_str(), policy) {
        (Ok(s), _) => Ok(Some(s.to_owned())),
        (Err(_), StringPolicy::Lossy) => Ok(Some(c_str.to_string_lossy().into_owned())),
        (Err(_), StringPolicy::Strict) => {
            tracing::warn!(field = %field, "native string is not valid UTF-8");
            Err(BoundaryError::InvalidUtf8 { field })
        },
    }
}
