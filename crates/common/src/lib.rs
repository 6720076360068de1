use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Version number sent in every API response envelope.
pub const PROTOCOL_VERSION: f64 = 0.1;

/// Filename (relative to the data directory) to metadata.
pub type MediaIndex = BTreeMap<String, MediaRecord>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(rename = "numRatings", default, skip_serializing_if = "is_zero")]
    pub num_ratings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl MediaRecord {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.num_ratings == 0 && self.tags.is_none()
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

pub fn relpath_from(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(path_to_slash_string(rel))
}

fn path_to_slash_string(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    parts.join("/")
}
