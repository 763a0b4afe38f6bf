//! Domain model for a flock, the aggregation root every other record
//! hangs off via `flockId`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlockStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flock {
    pub id: String,
    pub name: String,
    /// BS date the chicks arrived.
    pub start_date: String,
    /// BS date the grow-out is expected to finish (start + 45 days).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Initial stock; immutable meaning, never decremented.
    pub total_birds: u32,
    pub status: FlockStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Flock {
    pub fn generate_id() -> String {
        super::generate_record_id("flock")
    }

    pub fn is_active(&self) -> bool {
        self.status == FlockStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_field_names() {
        let flock = Flock {
            id: "flock-1".into(),
            name: "Batch A".into(),
            start_date: "2081-01-01".into(),
            end_date: Some("2081-02-15".into()),
            total_birds: 500,
            status: FlockStatus::Active,
            notes: None,
        };
        let json = serde_json::to_value(&flock).unwrap();
        assert_eq!(json["startDate"], "2081-01-01");
        assert_eq!(json["totalBirds"], 500);
        assert_eq!(json["status"], "active");
        assert!(json.get("notes").is_none());
    }
}
