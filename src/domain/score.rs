//! Derived per-country scores.

use serde::{Deserialize, Serialize};

use super::country::CountryName;
use super::medal::MedalCount;

/// Score for one country in one run. Recomputed every run, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub country: CountryName,

    /// Counts the weight was computed from
    pub counts: MedalCount,

    /// 3·gold + 2·silver + 1·bronze
    pub weight: u64,

    /// Always >= 0, defaults to 1.0
    pub multiplier: f64,

    /// weight · multiplier
    pub final_score: f64,
}
