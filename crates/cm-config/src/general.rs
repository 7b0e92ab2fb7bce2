//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_db_path() -> String {
    ".carbon/carbon.db".to_string()
}

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Path of the libSQL database file. `:memory:` keeps everything in RAM.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Default result limit for list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            default_limit: default_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.db_path, ".carbon/carbon.db");
        assert_eq!(config.default_limit, 20);
    }
}
