// econorm-core/src/infrastructure/config/loader.rs

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use super::settings::EconormSettings;
use crate::domain::quality::QualityConfig;
use crate::domain::units::{Scale, TimeScale};
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["econorm.yaml", "econorm_config.yaml"];
const QUALITY_FRAGMENT: &str = "quality.yaml";

pub const ENV_TO_CURRENCY: &str = "ECONORM_TO_CURRENCY";
pub const ENV_TO_MAGNITUDE: &str = "ECONORM_TO_MAGNITUDE";
pub const ENV_TO_TIME_SCALE: &str = "ECONORM_TO_TIME_SCALE";
pub const ENV_CONCURRENCY: &str = "ECONORM_CONCURRENCY";
pub const ENV_FX_PATH: &str = "ECONORM_FX_PATH";

/// Loads the configuration found in `dir`, layered with process environment overrides.
#[instrument(skip(dir))]
pub fn load_settings(dir: &Path) -> Result<EconormSettings, InfrastructureError> {
    load_settings_with_env(dir, |key| std::env::var(key).ok())
}

/// Same as [`load_settings`] with an explicit environment lookup.
pub fn load_settings_with_env<F>(dir: &Path, lookup: F) -> Result<EconormSettings, InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    // 1. Main file
    let config_path = find_main_config(dir)?;
    info!(path = ?config_path, "Loading econorm configuration");
    let mut settings: EconormSettings = load_fragment(&config_path)?;

    // 2. Optional quality fragment next to it
    let quality_path = dir.join(QUALITY_FRAGMENT);
    if quality_path.exists() {
        settings.quality = load_fragment::<QualityConfig>(&quality_path)?;
        info!(path = ?quality_path, "Quality settings loaded");
    }

    // 3. Environment layer
    apply_env_overrides(&mut settings, lookup)?;

    // 4. Relative FX paths follow the configuration file
    if let Some(fx_path) = settings.fx_path.as_mut()
        && Path::new(fx_path.as_str()).is_relative()
    {
        *fx_path = dir.join(fx_path.as_str()).to_string_lossy().into_owned();
    }

    settings.validate()?;
    Ok(settings)
}

pub fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

/// Reads one typed YAML document.
fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {:?}", path))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML at {:?}", path))
        .map_err(Into::into)
}

fn apply_env_overrides<F>(settings: &mut EconormSettings, lookup: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    let invalid = |key: &str, reason: String| {
        InfrastructureError::ConfigError(format!("{}: {}", key, reason))
    };

    if let Some(val) = lookup(ENV_TO_CURRENCY) {
        info!(old = ?settings.to_currency, new = %val, "Overriding target currency via ENV");
        settings.to_currency = Some(val.trim().to_ascii_uppercase());
    }
    if let Some(val) = lookup(ENV_TO_MAGNITUDE) {
        let scale = val.parse::<Scale>().map_err(|e| invalid(ENV_TO_MAGNITUDE, e))?;
        info!(old = ?settings.to_magnitude, new = ?scale, "Overriding target magnitude via ENV");
        settings.to_magnitude = Some(scale);
    }
    if let Some(val) = lookup(ENV_TO_TIME_SCALE) {
        let time_scale = val
            .parse::<TimeScale>()
            .map_err(|e| invalid(ENV_TO_TIME_SCALE, e))?;
        info!(old = ?settings.to_time_scale, new = ?time_scale, "Overriding target time scale via ENV");
        settings.to_time_scale = Some(time_scale);
    }
    if let Some(val) = lookup(ENV_CONCURRENCY) {
        let concurrency = val
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(ENV_CONCURRENCY, e.to_string()))?;
        info!(old = settings.concurrency, new = concurrency, "Overriding concurrency via ENV");
        settings.concurrency = concurrency;
    }
    if let Some(val) = lookup(ENV_FX_PATH) {
        info!(old = ?settings.fx_path, new = %val, "Overriding FX path via ENV");
        settings.fx_path = Some(val);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::quality::OutlierMethod;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_config() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let result = load_settings_with_env(dir.path(), no_env);
        assert!(matches!(result, Err(InfrastructureError::ConfigNotFound(_))));
        Ok(())
    }

    #[test]
    fn test_candidates_and_quality_fragment() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("econorm_config.yaml"), "to_currency: EUR\n")?;
        fs::write(
            dir.path().join(QUALITY_FRAGMENT),
            "outlier_method: z_score\nz_threshold: 2.0\n",
        )?;

        let settings = load_settings_with_env(dir.path(), no_env)?;
        assert_eq!(settings.to_currency.as_deref(), Some("EUR"));
        assert_eq!(settings.quality.outlier_method, OutlierMethod::ZScore);
        Ok(())
    }

    #[test]
    fn test_env_layer_wins() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("econorm.yaml"),
            "to_currency: EUR\nto_magnitude: thousands\nconcurrency: 2\n",
        )?;
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_TO_CURRENCY, "usd"),
            (ENV_TO_MAGNITUDE, "billions"),
            (ENV_TO_TIME_SCALE, "quarter"),
            (ENV_CONCURRENCY, "16"),
        ]);

        let settings =
            load_settings_with_env(dir.path(), |k| env.get(k).map(|v| v.to_string()))?;
        assert_eq!(settings.to_currency.as_deref(), Some("USD"));
        assert_eq!(settings.to_magnitude, Some(Scale::Billions));
        assert_eq!(settings.to_time_scale, Some(TimeScale::Quarter));
        assert_eq!(settings.concurrency, 16);
        Ok(())
    }

    #[test]
    fn test_bad_env_value() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("econorm.yaml"), "{}\n")?;
        let result = load_settings_with_env(dir.path(), |k| {
            (k == ENV_CONCURRENCY).then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(InfrastructureError::ConfigError(_))));
        Ok(())
    }

    #[test]
    fn test_env_value_still_validated() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("econorm.yaml"), "{}\n")?;
        let result = load_settings_with_env(dir.path(), |k| {
            (k == ENV_CONCURRENCY).then(|| "0".to_string())
        });
        assert!(matches!(result, Err(InfrastructureError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_relative_fx_path_resolved() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("econorm.yaml"), "fx_path: rates.json\n")?;
        fs::write(
            dir.path().join("rates.json"),
            r#"{"base": "USD", "rates": {"EUR": 0.9}}"#,
        )?;

        let settings = load_settings_with_env(dir.path(), no_env)?;
        assert!(Path::new(settings.fx_path.as_deref().unwrap()).is_absolute());

        let options = settings.into_batch_options()?;
        assert_eq!(options.fx.unwrap().rate("EUR"), Some(0.9));
        Ok(())
    }
}
