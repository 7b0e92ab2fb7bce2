use cm_config::CarbonConfig;
use figment::Jail;

#[test]
fn env_vars_map_to_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("CARBON_PREDICTOR__URL", "http://oracle.internal/predict");
        jail.set_env("CARBON_FORECAST__MIN_REAL_OBSERVATIONS", "10");
        jail.set_env("CARBON_GENERAL__DB_PATH", ":memory:");

        let config = CarbonConfig::load().expect("config loads");
        assert_eq!(config.predictor.url, "http://oracle.internal/predict");
        assert_eq!(config.forecast.min_real_observations, 10);
        assert_eq!(config.general.db_path, ":memory:");
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".carbon")?;
        jail.create_file(".carbon/config.toml", "[credits]\nmax_price = 2000.0\n")?;
        jail.set_env("CARBON_CREDITS__MAX_PRICE", "2800");

        let config = CarbonConfig::load().expect("config loads");
        assert!((config.credits.max_price - 2800.0).abs() < f64::EPSILON);
        Ok(())
    });
}

#[test]
fn unrelated_carbon_vars_are_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("CARBON_LOG", "debug");

        let config = CarbonConfig::load().expect("config loads");
        assert!(config.validate().is_ok());
        Ok(())
    });
}
