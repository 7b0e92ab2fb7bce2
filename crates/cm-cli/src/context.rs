use anyhow::Context;
use cm_config::CarbonConfig;
use cm_engine::CarbonEngine;
use cm_predictor::HttpPredictor;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub engine: CarbonEngine<HttpPredictor>,
}

impl AppContext {
    /// Open the store and build the predictor client from `config`.
    pub async fn init(config: CarbonConfig) -> anyhow::Result<Self> {
        ensure_db_dir(&config.general.db_path)?;

        let predictor = HttpPredictor::new(&config.predictor.url, config.predictor.timeout())
            .context("failed to build predictor client")?;
        let engine = CarbonEngine::open(config, predictor)
            .await
            .context("failed to open carbon store")?;
        Ok(Self { engine })
    }
}

/// Load layered config, apply `--db`, and validate.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<CarbonConfig> {
    let mut config = CarbonConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(db) = flags.db.as_deref() {
        config.general.db_path = db.to_string();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn ensure_db_dir(db_path: &str) -> anyhow::Result<()> {
    if db_path == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &CarbonConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &CarbonConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    if !config.predictor.is_configured()
        && env_keys
            .iter()
            .any(|key| key.starts_with("CARBON_PREDICTOR") && !key.starts_with("CARBON_PREDICTOR__"))
    {
        warnings.push(
            "Predictor config appears default while CARBON_PREDICTOR* env vars exist. Use double underscores (example: CARBON_PREDICTOR__URL)."
                .to_string(),
        );
    }

    if !config.predictor.is_configured() {
        tracing::debug!("no predictor url configured; gap filling uses the trailing mean");
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(keys: &[&str]) -> Vec<(String, String)> {
        keys.iter()
            .map(|key| ((*key).to_string(), "x".to_string()))
            .collect()
    }

    #[test]
    fn single_underscore_predictor_key_warns() {
        let config = CarbonConfig::default();
        let warnings = collect_unconfigured_warnings(&config, env(&["CARBON_PREDICTOR_URL"]));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("CARBON_PREDICTOR__URL"));
    }

    #[test]
    fn no_warning_without_env() {
        let config = CarbonConfig::default();
        assert!(collect_unconfigured_warnings(&config, env(&["HOME"])).is_empty());
    }
}
