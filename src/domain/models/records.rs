//! Per-flock ledger records: medicine purchases, miscellaneous expenses,
//! mortality entries, and bird sales.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: String,
    pub flock_id: String,
    /// BS date.
    pub date: String,
    pub name: String,
    pub quantity: f64,
    pub rate: f64,
    pub total: f64,
}

impl Medicine {
    pub fn generate_id() -> String {
        super::generate_record_id("med")
    }

    pub fn expected_total(&self) -> f64 {
        self.quantity * self.rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub flock_id: String,
    /// BS date.
    pub date: String,
    pub name: String,
    pub quantity: f64,
    pub rate: f64,
    pub total: f64,
}

impl Expense {
    pub fn generate_id() -> String {
        super::generate_record_id("exp")
    }

    pub fn expected_total(&self) -> f64 {
        self.quantity * self.rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mortality {
    pub id: String,
    pub flock_id: String,
    /// BS date.
    pub date: String,
    /// Birds lost; at least 1.
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl Mortality {
    pub fn generate_id() -> String {
        super::generate_record_id("mort")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub flock_id: String,
    /// BS date.
    pub date: String,
    /// Birds sold.
    pub quantity: u32,
    pub weight_kg: f64,
    /// Price per kg.
    pub rate: f64,
    /// Stored denormalized; total = weightKg x rate.
    pub total: f64,
}

impl Sale {
    pub fn generate_id() -> String {
        super::generate_record_id("sale")
    }

    pub fn expected_total(&self) -> f64 {
        self.weight_kg * self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_total_is_weight_times_rate() {
        let sale = Sale {
            id: "sale-1".into(),
            flock_id: "flock-1".into(),
            date: "2081-02-10".into(),
            quantity: 120,
            weight_kg: 264.5,
            rate: 410.0,
            total: 108445.0,
        };
        assert_eq!(sale.expected_total(), 264.5 * 410.0);
        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["weightKg"], 264.5);
    }

    #[test]
    fn mortality_omits_empty_remarks() {
        let m = Mortality {
            id: "mort-1".into(),
            flock_id: "flock-1".into(),
            date: "2081-01-10".into(),
            count: 3,
            remarks: None,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("remarks").is_none());
        assert_eq!(json["count"], 3);
    }
}
