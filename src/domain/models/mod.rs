//! Domain models for the farm ledger.
//!
//! All records are plain serde structs identified by caller-generated
//! string ids. Wire field names stay camelCase so device backups written
//! by earlier builds of the application import unchanged. Date fields are
//! Bikram Sambat date strings (`YYYY-MM-DD`); the calendar engine parses
//! them on demand and unparseable values are treated as unknown.

pub mod feed;
pub mod flock;
pub mod gallery;
pub mod records;
pub mod settings;
pub mod vaccine;

pub use feed::{Feed, FeedType};
pub use flock::{Flock, FlockStatus};
pub use gallery::GalleryItem;
pub use records::{Expense, Medicine, Mortality, Sale};
pub use settings::AppSettings;
pub use vaccine::{Vaccine, VaccineStatus, VACCINE_SCHEDULE};

use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a timestamp-derived record id.
/// Format: `<prefix>-<timestamp_ms>-<suffix>`, e.g. `feed-1717581234567-9f3a`.
pub(crate) fn generate_record_id(prefix: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!(
        "{}-{}-{:04x}",
        prefix,
        now.as_millis(),
        now.subsec_nanos() % 0x1_0000
    )
}
