//! Domain model for a photo-log entry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub flock_id: String,
    /// Base64-encoded image bytes.
    pub image_data: String,
    /// BS date.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl GalleryItem {
    /// Gallery ids must stay unique under rapid successive captures, so
    /// they use a random UUID rather than a timestamp token.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_under_rapid_generation() {
        let ids: HashSet<String> = (0..1000).map(|_| GalleryItem::generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
