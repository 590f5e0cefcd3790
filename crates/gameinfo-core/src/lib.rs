pub mod application;
pub mod codec;
pub mod config;
pub mod ffi;
pub mod layout;
pub mod native;
pub mod record;

pub use layout::{FIELD_COUNT, FIELD_ORDER, Field, FieldValue, LayoutMismatch, field_order};
pub use record::GameMetadataRecord;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::record::GameMetadataRecord;

    /// A record with every field populated with distinct values.
    pub fn make_example_record() -> GameMetadataRecord {
        GameMetadataRecord {
            file_size: 1_234_567.0,
            title_name: Some("Example Game".to_string()),
            title_id: Some("0100000000010000".to_string()),
            developer: Some("Studio X".to_string()),
            version: Some("1.2.0".to_string()),
            icon: Some("icon_ref_1".to_string()),
        }
    }

    /// A record with only a title, everything else left at defaults.
    pub fn make_title_only_record(title: &str) -> GameMetadataRecord {
        GameMetadataRecord {
            title_name: Some(title.to_string()),
            ..GameMetadataRecord::default()
        }
    }
}
