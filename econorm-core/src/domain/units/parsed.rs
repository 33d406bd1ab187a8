// econorm-core/src/domain/units/parsed.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use super::scale::Scale;
use super::time_scale::TimeScale;

/// Placeholder currency for non-ISO local-currency labels ("National currency").
pub const UNKNOWN_CURRENCY: &str = "UNKNOWN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UnitCategory {
    #[serde(rename = "currency-amount")]
    Currency,
    Percentage,
    Index,
    Count,
    Ratio,
    /// Exchange-rate style units ("PKR/USD"). Never FX-converted.
    FxRatio,
    Physical,
    Energy,
    Temperature,
    #[default]
    Unknown,
}

impl UnitCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Currency => "currency-amount",
            Self::Percentage => "percentage",
            Self::Index => "index",
            Self::Count => "count",
            Self::Ratio => "ratio",
            Self::FxRatio => "fx-ratio",
            Self::Physical => "physical",
            Self::Energy => "energy",
            Self::Temperature => "temperature",
            Self::Unknown => "unknown",
        }
    }

    /// Categories whose values are returned untouched by the normalizer.
    pub fn is_passthrough(&self) -> bool {
        matches!(
            self,
            Self::Percentage | Self::Index | Self::Ratio | Self::FxRatio | Self::Temperature
        )
    }

    /// Maps an upstream `unit_type` label onto a category.
    pub fn from_unit_type(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().replace('_', "-").as_str() {
            "currency" | "currency-amount" | "monetary" => Some(Self::Currency),
            "percentage" | "percent" => Some(Self::Percentage),
            "index" => Some(Self::Index),
            "count" => Some(Self::Count),
            "ratio" => Some(Self::Ratio),
            "fx-ratio" | "exchange-rate" => Some(Self::FxRatio),
            "physical" => Some(Self::Physical),
            "energy" => Some(Self::Energy),
            "temperature" => Some(Self::Temperature),
            _ => None,
        }
    }
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured reading of a free-form unit string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParsedUnit {
    pub category: UnitCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_scale: Option<TimeScale>,
    /// Non-time denominator, e.g. "barrel" in "USD per barrel".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_label: Option<String>,
}

impl ParsedUnit {
    pub fn is_unknown(&self) -> bool {
        self.category == UnitCategory::Unknown
    }

    pub fn has_iso_currency(&self) -> bool {
        self.currency
            .as_deref()
            .is_some_and(|c| c != UNKNOWN_CURRENCY)
    }
}
