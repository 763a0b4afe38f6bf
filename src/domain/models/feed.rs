//! Domain model for a feed purchase.

use serde::{Deserialize, Serialize};

/// Broiler feed phases; `Custom` covers anything off the standard program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedType {
    B0,
    B1,
    B2,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub id: String,
    pub flock_id: String,
    /// Supplier bill number; unique across the whole farm, not per flock.
    pub bill_no: String,
    /// BS purchase date.
    pub date: String,
    #[serde(rename = "type")]
    pub feed_type: FeedType,
    /// Number of sacks.
    pub quantity: f64,
    /// Price per sack.
    pub rate: f64,
    /// Stored denormalized; validated against quantity x rate on write.
    pub total: f64,
}

impl Feed {
    pub fn generate_id() -> String {
        super::generate_record_id("feed")
    }

    pub fn expected_total(&self) -> f64 {
        self.quantity * self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_type_uses_phase_labels() {
        let feed = Feed {
            id: "feed-1".into(),
            flock_id: "flock-1".into(),
            bill_no: "B-1001".into(),
            date: "2081-01-05".into(),
            feed_type: FeedType::B1,
            quantity: 10.0,
            rate: 3200.0,
            total: 32000.0,
        };
        let json = serde_json::to_value(&feed).unwrap();
        assert_eq!(json["type"], "B1");
        assert_eq!(json["billNo"], "B-1001");
        assert_eq!(feed.expected_total(), 32000.0);
    }
}
