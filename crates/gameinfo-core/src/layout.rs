//! Field-order contract for [`GameMetadataRecord`].
//!
//! Marshaling layers resolve fields by position, never by name. Everything
//! here is a compile-time constant so both sides of a boundary can derive the
//! same layout from the same definition.

use std::ffi::CStr;

use serde::{Deserialize, Serialize};

use crate::record::GameMetadataRecord;

/// Number of fields in the record layout.
pub const FIELD_COUNT: usize = 6;

/// One field of the record layout, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Field {
    FileSize = 0,
    TitleName = 1,
    TitleId = 2,
    Developer = 3,
    Version = 4,
    Icon = 5,
}

/// The fixed field order shared with every boundary consumer.
pub const FIELD_ORDER: [Field; FIELD_COUNT] = [
    Field::FileSize,
    Field::TitleName,
    Field::TitleId,
    Field::Developer,
    Field::Version,
    Field::Icon,
];

/// Field names as a native consumer sees them, in layout order.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    Field::FileSize.name(),
    Field::TitleName.name(),
    Field::TitleId.name(),
    Field::Developer.name(),
    Field::Version.name(),
    Field::Icon.name(),
];

/// Returns the layout order. Always the same six fields in the same order.
pub const fn field_order() -> &'static [Field; FIELD_COUNT] {
    &FIELD_ORDER
}

/// Storage class of a field across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// 64-bit IEEE 754 float.
    Float64,
    /// Nullable text string.
    Text,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float64 => write!(f, "f64"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl Field {
    /// Field name as declared by the layout contract.
    pub const fn name(self) -> &'static str {
        match self {
            Self::FileSize => "FileSize",
            Self::TitleName => "TitleName",
            Self::TitleId => "TitleId",
            Self::Developer => "Developer",
            Self::Version => "Version",
            Self::Icon => "Icon",
        }
    }

    /// NUL-terminated name for native callers, same text as [`Field::name`].
    pub const fn c_name(self) -> &'static CStr {
        match self {
            Self::FileSize => c"FileSize",
            Self::TitleName => c"TitleName",
            Self::TitleId => c"TitleId",
            Self::Developer => c"Developer",
            Self::Version => c"Version",
            Self::Icon => c"Icon",
        }
    }

    /// Position of the field within the layout.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            Self::FileSize => FieldKind::Float64,
            _ => FieldKind::Text,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < FIELD_COUNT {
            Some(FIELD_ORDER[index])
        } else {
            None
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single field value, detached from its record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float64(f64),
    Text(Option<String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Float64(_) => FieldKind::Float64,
            Self::Text(_) => FieldKind::Text,
        }
    }
}

/// Producer and consumer disagree on field count, order, or type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutMismatch {
    FieldCount {
        expected: usize,
        found: usize,
    },
    FieldKind {
        field: Field,
        expected: FieldKind,
        found: FieldKind,
    },
    FieldOrder {
        position: usize,
        expected: Field,
        found: Field,
    },
}

impl std::fmt::Display for LayoutMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldCount { expected, found } => {
                write!(f, "field count mismatch: expected {expected}, found {found}")
            },
            Self::FieldKind {
                field,
                expected,
                found,
            } => write!(f, "field {field} expects {expected}, got {found}"),
            Self::FieldOrder {
                position,
                expected,
                found,
            } => write!(
                f,
                "field order mismatch at position {position}: expected {expected}, found {found}"
            ),
        }
    }
}

impl std::error::Error for LayoutMismatch {}

impl GameMetadataRecord {
    /// Read a field by position.
    pub fn field(&self, field: Field) -> FieldValue {
        match field {
            Field::FileSize => FieldValue::Float64(self.file_size),
            Field::TitleName => FieldValue::Text(self.title_name.clone()),
            Field::TitleId => FieldValue::Text(self.title_id.clone()),
            Field::Developer => FieldValue::Text(self.developer.clone()),
            Field::Version => FieldValue::Text(self.version.clone()),
            Field::Icon => FieldValue::Text(self.icon.clone()),
        }
    }

    /// Write a field by position. Only a float/text kind mismatch is rejected;
    /// contents are stored as given.
    pub fn set_field(&mut self, field: Field, value: FieldValue) -> Result<(), LayoutMismatch> {
        match (field, value) {
            (Field::FileSize, FieldValue::Float64(v)) => self.file_size = v,
            (Field::TitleName, FieldValue::Text(v)) => self.title_name = v,
            (Field::TitleId, FieldValue::Text(v)) => self.title_id = v,
            (Field::Developer, FieldValue::Text(v)) => self.developer = v,
            (Field::Version, FieldValue::Text(v)) => self.version = v,
            (Field::Icon, FieldValue::Text(v)) => self.icon = v,
            (field, value) => {
                return Err(LayoutMismatch::FieldKind {
                    field,
                    expected: field.kind(),
                    found: value.kind(),
                });
            },
        }
        Ok(())
    }

    /// All fields in layout order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, FieldValue)> + '_ {
        FIELD_ORDER.iter().map(|&f| (f, self.field(f)))
    }

    /// Rebuild a record from exactly [`FIELD_COUNT`] positional values.
    pub fn from_fields<I>(fields: I) -> Result<Self, LayoutMismatch>
    where
        I: IntoIterator<Item = (Field, FieldValue)>,
    {
        let mut record = Self::new();
        let mut count = 0;
        for (position, (field, value)) in fields.into_iter().enumerate() {
            let Some(expected) = Field::from_index(position) else {
                return Err(LayoutMismatch::FieldCount {
                    expected: FIELD_COUNT,
                    found: FIELD_COUNT + 1,
                });
            };
            if field != expected {
                return Err(LayoutMismatch::FieldOrder {
                    position,
                    expected,
                    found: field,
                });
            }
            record.set_field(field, value)?;
            count = position + 1;
        }
        if count != FIELD_COUNT {
            return Err(LayoutMismatch::FieldCount {
                expected: FIELD_COUNT,
                found: count,
            });
        }
        Ok(record)
    }
}
