use serde::{Deserialize, Serialize};

/// Metadata for one installed application, as handed across the native boundary.
///
/// Field declaration order is the layout contract: the positional wire array,
/// the `#[repr(C)]` mirror in [`crate::native`], and [`crate::layout::FIELD_ORDER`]
/// all follow it. Never reorder these fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetadataRecord {
    /// Size in bytes. `0.0` when unset.
    pub file_size: f64,
    pub title_name: Option<String>,
    pub title_id: Option<String>,
    pub developer: Option<String>,
    /// Free-form version string.
    pub version: Option<String>,
    /// Icon reference, either a path or an encoded blob.
    pub icon: Option<String>,
}

impl GameMetadataRecord {
    /// An empty record: zero file size, every string absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been populated yet.
    pub fn is_empty(&self) -> bool {
        self.file_size == 0.0
            && self.title_name.is_none()
            && self.title_id.is_none()
            && self.developer.is_none()
            && self.version.is_none()
            && self.icon.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_defaults() {
        let record = GameMetadataRecord::new();
        assert_eq!(record.file_size, 0.0);
        assert!(record.title_name.is_none());
        assert!(record.title_id.is_none());
        assert!(record.developer.is_none());
        assert!(record.version.is_none());
        assert!(record.icon.is_none());
        assert!(record.is_empty());
    }

    #[test]
    fn new_matches_default() {
        assert_eq!(GameMetadataRecord::new(), GameMetadataRecord::default());
    }

    #[test]
    fn populated_record_reads_back_exactly() {
        let record = GameMetadataRecord {
            file_size: 1_234_567.0,
            title_name: Some("Example Game".to_string()),
            title_id: Some("0100000000010000".to_string()),
            developer: Some("Studio X".to_string()),
            version: Some("1.2.0".to_string()),
            icon: Some("icon_ref_1".to_string()),
        };
        assert_eq!(record.file_size, 1_234_567.0);
        assert_eq!(record.title_name.as_deref(), Some("Example Game"));
        assert_eq!(record.title_id.as_deref(), Some("0100000000010000"));
        assert_eq!(record.developer.as_deref(), Some("Studio X"));
        assert_eq!(record.version.as_deref(), Some("1.2.0"));
        assert_eq!(record.icon.as_deref(), Some("icon_ref_1"));
        assert!(!record.is_empty());
    }

    #[test]
    fn empty_string_is_kept_distinct_from_absent() {
        let record = GameMetadataRecord {
            developer: Some(String::new()),
            ..GameMetadataRecord::default()
        };
        assert_eq!(record.developer.as_deref(), Some(""));
        assert!(!record.is_empty());
    }

    #[test]
    fn named_json_keeps_declaration_order() {
        let record = GameMetadataRecord {
            title_name: Some("Example Game".to_string()),
            ..GameMetadataRecord::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        let keys = [
            "\"file_size\"",
            "\"title_name\"",
            "\"title_id\"",
            "\"developer\"",
            "\"version\"",
            "\"icon\"",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| json.find(k).unwrap_or_else(|| panic!("missing key {k} in {json}")))
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "JSON keys out of order: {json}"
        );
    }
}
