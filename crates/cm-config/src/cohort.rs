//! Cohort assembly policy.

use serde::{Deserialize, Serialize};

const fn default_min_real_peers() -> u32 {
    3
}

fn default_sector() -> String {
    "IT".to_string()
}

const fn default_window_days() -> u32 {
    365
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CohortConfig {
    /// Real peers below this count trigger the demo blend.
    #[serde(default = "default_min_real_peers")]
    pub min_real_peers: u32,

    /// Sector used when neither the request nor the profile names one.
    #[serde(default = "default_sector")]
    pub default_sector: String,

    /// Days of emissions summed into each cohort member's total.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            min_real_peers: default_min_real_peers(),
            default_sector: default_sector(),
            window_days: default_window_days(),
        }
    }
}
