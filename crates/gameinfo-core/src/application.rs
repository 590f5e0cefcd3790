//! Building records from what an application scanner reports.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::record::GameMetadataRecord;

/// Upstream description of one installed application, as a library scanner
/// produces it before any boundary marshaling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationSummary {
    /// Numeric title id. `0` means the application has none.
    pub title_id: u64,
    pub name: String,
    pub developer: String,
    pub version: String,
    /// Raw icon image bytes.
    pub icon: Option<Vec<u8>>,
    pub size_bytes: u64,
}

/// 16 lowercase hex digits, or `None` for the zero id.
pub fn format_title_id(title_id: u64) -> Option<String> {
    (title_id != 0).then(|| format!("{title_id:016x}"))
}

/// Base64 (standard alphabet, padded) of the icon bytes.
pub fn encode_icon(icon: &[u8]) -> Option<String> {
    (!icon.is_empty()).then(|| STANDARD.encode(icon))
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

impl From<&ApplicationSummary> for GameMetadataRecord {
    fn from(app: &ApplicationSummary) -> Self {
        Self {
            file_size: app.size_bytes as f64,
            title_name: non_empty(&app.name),
            title_id: format_title_id(app.title_id),
            developer: non_empty(&app.developer),
            version: non_empty(&app.version),
            icon: app.icon.as_deref().and_then(encode_icon),
        }
    }
}
