//! Application settings singleton.
//!
//! Every field carries a serde default so a settings file written by an
//! older build (or a partial object inside an imported backup) merges over
//! the documented defaults instead of failing to load.

use serde::{Deserialize, Serialize};

const DEFAULT_SACK_WEIGHT_KG: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Hash of the unlock PIN; hashing itself is a presentation concern,
    /// the core stores the value opaquely.
    #[serde(default)]
    pub pin_hash: Option<String>,
    #[serde(default)]
    pub is_setup: bool,
    #[serde(default)]
    pub dark_mode: bool,
    /// Weight of one feed sack, used to turn sack counts into kilograms.
    #[serde(default = "default_sack_weight")]
    pub sack_weight_kg: f64,
}

fn default_sack_weight() -> f64 {
    DEFAULT_SACK_WEIGHT_KG
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            pin_hash: None,
            is_setup: false,
            dark_mode: false,
            sack_weight_kg: DEFAULT_SACK_WEIGHT_KG,
        }
    }
}
