// econorm-core/src/domain/semantics/indicator.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Upstream classification of what an indicator measures.
/// Open taxonomy: unrecognised labels land on `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Stock,
    Flow,
    Balance,
    Capacity,
    Volume,
    Count,
    Percentage,
    Ratio,
    Spread,
    Share,
    Price,
    Yield,
    Rate,
    Volatility,
    Gap,
    Index,
    Correlation,
    Elasticity,
    Multiplier,
    Duration,
    Probability,
    Threshold,
    Sentiment,
    Allocation,
    Other,
}

impl IndicatorType {
    pub const ALL: [IndicatorType; 25] = [
        Self::Stock,
        Self::Flow,
        Self::Balance,
        Self::Capacity,
        Self::Volume,
        Self::Count,
        Self::Percentage,
        Self::Ratio,
        Self::Spread,
        Self::Share,
        Self::Price,
        Self::Yield,
        Self::Rate,
        Self::Volatility,
        Self::Gap,
        Self::Index,
        Self::Correlation,
        Self::Elasticity,
        Self::Multiplier,
        Self::Duration,
        Self::Probability,
        Self::Threshold,
        Self::Sentiment,
        Self::Allocation,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Flow => "flow",
            Self::Balance => "balance",
            Self::Capacity => "capacity",
            Self::Volume => "volume",
            Self::Count => "count",
            Self::Percentage => "percentage",
            Self::Ratio => "ratio",
            Self::Spread => "spread",
            Self::Share => "share",
            Self::Price => "price",
            Self::Yield => "yield",
            Self::Rate => "rate",
            Self::Volatility => "volatility",
            Self::Gap => "gap",
            Self::Index => "index",
            Self::Correlation => "correlation",
            Self::Elasticity => "elasticity",
            Self::Multiplier => "multiplier",
            Self::Duration => "duration",
            Self::Probability => "probability",
            Self::Threshold => "threshold",
            Self::Sentiment => "sentiment",
            Self::Allocation => "allocation",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IndicatorType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Ok(Self::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .unwrap_or(Self::Other))
    }
}

impl Serialize for IndicatorType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IndicatorType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let parsed = Self::from_str(&s).unwrap_or(Self::Other);
        if parsed == Self::Other && !s.trim().eq_ignore_ascii_case("other") {
            warn!(label = %s, "unrecognised indicator_type, treating as 'other'");
        }
        Ok(parsed)
    }
}

/// How a value aggregates over its reporting period. Upstream-authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemporalAggregation {
    PointInTime,
    PeriodRate,
    PeriodCumulative,
    PeriodAverage,
    PeriodTotal,
    NotApplicable,
}

impl TemporalAggregation {
    pub const ALL: [TemporalAggregation; 6] = [
        Self::PointInTime,
        Self::PeriodRate,
        Self::PeriodCumulative,
        Self::PeriodAverage,
        Self::PeriodTotal,
        Self::NotApplicable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PointInTime => "point-in-time",
            Self::PeriodRate => "period-rate",
            Self::PeriodCumulative => "period-cumulative",
            Self::PeriodAverage => "period-average",
            Self::PeriodTotal => "period-total",
            Self::NotApplicable => "not-applicable",
        }
    }
}

impl fmt::Display for TemporalAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TemporalAggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| format!("Unknown temporal aggregation: {}", s))
    }
}

/// Lenient reader for optional upstream enums: invalid labels become `None`
/// (with a warning) instead of failing the whole batch.
pub fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => match T::from_str(label) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(label, error = %e, "ignoring unrecognised upstream label");
                Ok(None)
            }
        },
    }
}
