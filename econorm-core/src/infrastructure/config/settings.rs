// econorm-core/src/infrastructure/config/settings.rs

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use validator::Validate;

use super::fx_file::load_fx_table;
use crate::application::options::{
    BatchOptions, DEFAULT_CONCURRENCY, DEFAULT_QUALITY_THRESHOLD, ErrorPolicy, RetryPolicy,
};
use crate::domain::quality::QualityConfig;
use crate::domain::targets::AutoTargetConfig;
use crate::domain::units::{Scale, TimeScale};
use crate::infrastructure::error::InfrastructureError;

/// Contents of `econorm.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EconormSettings {
    #[serde(default)]
    #[validate(length(equal = 3, message = "to_currency must be a 3-letter ISO code"))]
    pub to_currency: Option<String>,

    #[serde(default)]
    pub to_magnitude: Option<Scale>,

    #[serde(default)]
    pub to_time_scale: Option<TimeScale>,

    #[serde(default)]
    pub handle_errors: ErrorPolicy,

    #[serde(default)]
    pub default_value: f64,

    #[serde(default)]
    pub default_unit: String,

    #[serde(default)]
    pub parallel: bool,

    #[serde(default = "default_concurrency")]
    #[validate(range(min = 1, max = 1024))]
    pub concurrency: usize,

    /// Run the quality gate before normalizing.
    #[serde(default)]
    pub validate: bool,

    #[serde(default = "default_quality_threshold")]
    #[validate(range(max = 100))]
    pub quality_threshold: u8,

    #[serde(default)]
    pub explain: bool,

    /// FX snapshot file (JSON or YAML). Relative paths resolve against the
    /// directory holding the configuration file.
    #[serde(default)]
    pub fx_path: Option<String>,

    #[serde(default)]
    pub fx_source: Option<String>,

    #[serde(default)]
    pub fx_source_id: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub auto_target: Option<AutoTargetConfig>,

    #[serde(default)]
    #[validate(nested)]
    pub quality: QualityConfig,

    #[serde(default)]
    #[validate(nested)]
    pub retry: Option<RetryPolicy>,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_quality_threshold() -> u8 {
    DEFAULT_QUALITY_THRESHOLD
}

impl Default for EconormSettings {
    fn default() -> Self {
        Self {
            to_currency: None,
            to_magnitude: None,
            to_time_scale: None,
            handle_errors: ErrorPolicy::default(),
            default_value: 0.0,
            default_unit: String::new(),
            parallel: false,
            concurrency: DEFAULT_CONCURRENCY,
            validate: false,
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            explain: false,
            fx_path: None,
            fx_source: None,
            fx_source_id: None,
            auto_target: None,
            quality: QualityConfig::default(),
            retry: None,
        }
    }
}

impl EconormSettings {
    /// Batch options for these settings, loading the FX snapshot if one is named.
    pub fn into_batch_options(self) -> Result<BatchOptions, InfrastructureError> {
        self.validate()?;
        let fx = match &self.fx_path {
            Some(path) => Some(Arc::new(load_fx_table(Path::new(path))?)),
            None => None,
        };
        let fx_source = self.fx_source.or_else(|| self.fx_path.clone());

        Ok(BatchOptions {
            validate: self.validate,
            handle_errors: self.handle_errors,
            default_value: self.default_value,
            default_unit: self.default_unit,
            parallel: self.parallel,
            concurrency: self.concurrency,
            quality_threshold: self.quality_threshold,
            to_currency: self.to_currency.map(|c| c.to_ascii_uppercase()),
            to_magnitude: self.to_magnitude,
            to_time_scale: self.to_time_scale,
            fx,
            explain: self.explain,
            fx_source,
            fx_source_id: self.fx_source_id,
            auto_target: self.auto_target,
            quality: self.quality,
            ..Default::default()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_defaults() -> anyhow::Result<()> {
        let settings: EconormSettings = serde_yaml::from_str("to_currency: usd\n")?;
        assert_eq!(settings.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(settings.handle_errors, ErrorPolicy::Skip);

        let options = settings.into_batch_options()?;
        assert_eq!(options.to_currency.as_deref(), Some("USD"));
        assert!(options.fx.is_none());
        Ok(())
    }

    #[test]
    fn test_full_document() -> anyhow::Result<()> {
        let yaml = r#"
to_magnitude: billions
to_time_scale: year
handle_errors: default
default_value: -1
parallel: true
concurrency: 4
auto_target:
  threshold: 0.6
  tie_breaker: prefer-default
quality:
  outlier_method: z_score
  z_threshold: 2.5
retry:
  max_attempts: 5
"#;
        let settings: EconormSettings = serde_yaml::from_str(yaml)?;
        assert_eq!(settings.retry.unwrap().max_attempts, 5);
        assert_eq!(settings.retry.unwrap().base_delay_ms, 100);

        let options = settings.into_batch_options()?;
        assert_eq!(options.to_magnitude, Some(Scale::Billions));
        assert_eq!(options.to_time_scale, Some(TimeScale::Year));
        assert_eq!(options.handle_errors, ErrorPolicy::Default);
        assert_eq!(options.chunk_size(), 4);
        assert_eq!(options.auto_target.unwrap().threshold, 0.6);
        Ok(())
    }

    #[test]
    fn test_out_of_range_rejected() -> anyhow::Result<()> {
        let settings: EconormSettings = serde_yaml::from_str("concurrency: 0\n")?;
        assert!(matches!(
            settings.into_batch_options(),
            Err(InfrastructureError::Validation(_))
        ));
        Ok(())
    }
}
