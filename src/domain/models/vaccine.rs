//! Domain model for a vaccine dose, plus the standard broiler schedule
//! applied to every new flock.

use serde::{Deserialize, Serialize};

/// Fixed broiler vaccination program: day offset from the flock start date
/// and the dose name. Five records are synthesized per flock at creation.
pub const VACCINE_SCHEDULE: [(i64, &str); 5] = [
    (1, "Marek (F1)"),
    (7, "Newcastle (F1)"),
    (14, "Gumboro (IBD)"),
    (21, "Newcastle (Booster)"),
    (28, "Gumboro (Booster)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaccineStatus {
    Pending,
    Completed,
    Missed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccine {
    pub id: String,
    pub flock_id: String,
    pub name: String,
    /// BS date, computed once at flock creation and never recomputed.
    pub scheduled_date: String,
    pub status: VaccineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Vaccine {
    pub fn generate_id() -> String {
        super::generate_record_id("vax")
    }

    /// A dose is overdue when it is still pending and its scheduled date
    /// lies strictly before `today`. Unparseable schedule dates are
    /// treated as unknown, never overdue.
    pub fn is_overdue_on(&self, today: &crate::calendar::BsDate) -> bool {
        if self.status != VaccineStatus::Pending {
            return false;
        }
        match self.scheduled_date.parse::<crate::calendar::BsDate>() {
            Ok(scheduled) => scheduled < *today,
            Err(_) => false,
        }
    }
}
