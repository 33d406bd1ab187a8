// econorm-core/src/application/options.rs

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::domain::fx::FxTable;
use crate::domain::normalization::{NormalizeOptions, Targets};
use crate::domain::quality::QualityConfig;
use crate::domain::targets::AutoTargetConfig;
use crate::domain::units::{Scale, TimeScale, UnitParser};
use crate::error::EconormError;

/// What happens to an item that cannot be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Abort the whole batch on the first failure.
    Throw,
    /// Record the item in `failed` and carry on.
    #[default]
    Skip,
    /// Substitute `default_value` / `default_unit` and count a success.
    Default,
}

impl ErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Throw => "throw",
            Self::Skip => "skip",
            Self::Default => "default",
        }
    }
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "throw" => Ok(Self::Throw),
            "skip" => Ok(Self::Skip),
            "default" => Ok(Self::Default),
            _ => Err(format!("Unknown error policy: {}", s)),
        }
    }
}

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_QUALITY_THRESHOLD: u8 = 70;

#[derive(Debug, Clone, Validate)]
pub struct BatchOptions {
    /// Run the quality gate before normalizing.
    pub validate: bool,
    pub handle_errors: ErrorPolicy,
    pub default_value: f64,
    pub default_unit: String,
    pub parallel: bool,
    #[validate(range(min = 1, max = 1024))]
    pub concurrency: usize,
    #[validate(range(max = 100))]
    pub quality_threshold: u8,
    #[validate(length(equal = 3))]
    pub to_currency: Option<String>,
    pub to_magnitude: Option<Scale>,
    pub to_time_scale: Option<TimeScale>,
    pub fx: Option<Arc<FxTable>>,
    pub explain: bool,
    pub fx_source: Option<String>,
    pub fx_source_id: Option<String>,
    /// Infer per-group targets for dimensions without an explicit one.
    #[validate(nested)]
    pub auto_target: Option<AutoTargetConfig>,
    #[validate(nested)]
    pub quality: QualityConfig,
    pub parser: UnitParser,
    pub cancellation: Option<CancellationToken>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            validate: false,
            handle_errors: ErrorPolicy::default(),
            default_value: 0.0,
            default_unit: String::new(),
            parallel: false,
            concurrency: DEFAULT_CONCURRENCY,
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            to_currency: None,
            to_magnitude: None,
            to_time_scale: None,
            fx: None,
            explain: false,
            fx_source: None,
            fx_source_id: None,
            auto_target: None,
            quality: QualityConfig::default(),
            parser: UnitParser::default(),
            cancellation: None,
        }
    }
}

impl BatchOptions {
    /// Explicit batch-level targets.
    pub fn targets(&self) -> Targets {
        Targets {
            currency: self.to_currency.as_deref().map(str::to_ascii_uppercase),
            scale: self.to_magnitude,
            time_scale: self.to_time_scale,
        }
    }

    /// Items per chunk: `concurrency` in parallel mode, one otherwise.
    pub fn chunk_size(&self) -> usize {
        if self.parallel {
            self.concurrency.max(1)
        } else {
            1
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    pub(crate) fn check(&self) -> Result<(), EconormError> {
        self.validate()
            .map_err(|e| EconormError::InvalidOptions(e.to_string()))?;
        if let Some(fx) = &self.fx {
            fx.check()?;
        }
        Ok(())
    }

    /// Batch-level half of the per-item normalization options.
    pub(crate) fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            fx: self.fx.clone(),
            explain: self.explain,
            fx_source: self.fx_source.clone(),
            fx_source_id: self.fx_source_id.clone(),
            ..Default::default()
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    100
}

/// Resubmission of failed items with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RetryPolicy {
    /// Total attempts, the first run included.
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): base, 2x base, 4x base...
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(1u64 << exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BatchOptions::default();
        assert_eq!(options.handle_errors, ErrorPolicy::Skip);
        assert_eq!(options.chunk_size(), 1);
        assert!(options.check().is_ok());
        assert!(options.targets().is_empty());
    }

    #[test]
    fn test_chunk_size_and_targets() {
        let options = BatchOptions {
            parallel: true,
            concurrency: 4,
            to_currency: Some("usd".into()),
            ..Default::default()
        };
        assert_eq!(options.chunk_size(), 4);
        assert_eq!(options.targets().currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_invalid_options() {
        let options = BatchOptions {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(options.check(), Err(EconormError::InvalidOptions(_))));

        let options = BatchOptions {
            to_currency: Some("DOLLARS".into()),
            ..Default::default()
        };
        assert!(options.check().is_err());
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay_ms: 50,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(50));
        assert_eq!(policy.delay_for(2), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(200));
    }

    #[test]
    fn test_policy_labels() {
        assert_eq!("THROW".parse::<ErrorPolicy>(), Ok(ErrorPolicy::Throw));
        assert!("explode".parse::<ErrorPolicy>().is_err());
    }
}
