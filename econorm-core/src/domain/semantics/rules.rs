// econorm-core/src/domain/semantics/rules.rs
//
// Conversion-legality rule table. Every indicator type maps to exactly one
// rule, and `temporal_aggregation` (when present) overrides the type for
// time conversions.

use serde::Serialize;
use tracing::warn;

use super::indicator::{IndicatorType, TemporalAggregation};

/// How a value relates to its reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBasis {
    /// Level observed at an instant (stocks, balances, prices).
    Snapshot,
    /// Accumulates over the period and can be re-expressed per other periods.
    FlowLike,
    /// No time dimension (ratios, indices, probabilities).
    Dimensionless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonetaryPolicy {
    /// Never FX-converted, whatever upstream flags claim.
    Never,
    /// Follows `is_currency_denominated`, else currency detection.
    Defer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SemanticRule {
    pub time_basis: TimeBasis,
    pub monetary: MonetaryPolicy,
}

impl IndicatorType {
    pub fn rule(&self) -> SemanticRule {
        use MonetaryPolicy::{Defer, Never};
        use TimeBasis::{Dimensionless, FlowLike, Snapshot};

        let (time_basis, monetary) = match self {
            Self::Stock => (Snapshot, Defer),
            Self::Flow => (FlowLike, Defer),
            Self::Balance => (Snapshot, Defer),
            Self::Capacity => (Snapshot, Defer),
            Self::Volume => (FlowLike, Never),
            Self::Count => (FlowLike, Never),
            Self::Percentage => (Dimensionless, Never),
            Self::Ratio => (Dimensionless, Defer),
            Self::Spread => (Dimensionless, Defer),
            Self::Share => (Dimensionless, Defer),
            Self::Price => (Snapshot, Defer),
            Self::Yield => (Dimensionless, Defer),
            Self::Rate => (FlowLike, Never),
            Self::Volatility => (Dimensionless, Defer),
            Self::Gap => (Dimensionless, Defer),
            Self::Index => (Dimensionless, Never),
            Self::Correlation => (Dimensionless, Defer),
            Self::Elasticity => (Dimensionless, Defer),
            Self::Multiplier => (Dimensionless, Defer),
            Self::Duration => (Dimensionless, Defer),
            Self::Probability => (Dimensionless, Defer),
            Self::Threshold => (Snapshot, Defer),
            Self::Sentiment => (Dimensionless, Never),
            Self::Allocation => (Dimensionless, Defer),
            Self::Other => (FlowLike, Defer),
        };
        SemanticRule {
            time_basis,
            monetary,
        }
    }
}

impl TemporalAggregation {
    pub fn allows_time_conversion(&self) -> bool {
        match self {
            Self::PointInTime | Self::NotApplicable | Self::PeriodCumulative => false,
            Self::PeriodRate | Self::PeriodTotal | Self::PeriodAverage => true,
        }
    }
}

/// Is re-expressing the value per another period legal?
/// Missing labels fall back to the permissive flow-like default.
pub fn allows_time_conversion(
    indicator_type: Option<IndicatorType>,
    temporal_aggregation: Option<TemporalAggregation>,
) -> bool {
    if let Some(aggregation) = temporal_aggregation {
        return aggregation.allows_time_conversion();
    }
    indicator_type
        .map(|t| t.rule().time_basis == TimeBasis::FlowLike)
        .unwrap_or(true)
}

/// Outcome of the currency-eligibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyDecision {
    pub eligible: bool,
    /// Upstream flagged the item as monetary but its type forbids conversion.
    pub conflict: bool,
}

pub fn currency_eligible(
    indicator_type: Option<IndicatorType>,
    is_currency_denominated: Option<bool>,
    currency_detected: bool,
) -> CurrencyDecision {
    let monetary = indicator_type
        .map(|t| t.rule().monetary)
        .unwrap_or(MonetaryPolicy::Defer);

    match monetary {
        MonetaryPolicy::Never => {
            let conflict = is_currency_denominated == Some(true);
            if conflict {
                warn!(
                    indicator_type = ?indicator_type,
                    "is_currency_denominated=true conflicts with a non-monetary indicator type; skipping FX"
                );
            }
            CurrencyDecision {
                eligible: false,
                conflict,
            }
        }
        MonetaryPolicy::Defer => CurrencyDecision {
            eligible: is_currency_denominated.unwrap_or(currency_detected),
            conflict: false,
        },
    }
}
