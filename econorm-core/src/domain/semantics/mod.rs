// econorm-core/src/domain/semantics/mod.rs

pub mod indicator;
pub mod rules;

pub use indicator::{IndicatorType, TemporalAggregation, deserialize_lenient};
pub use rules::{
    CurrencyDecision, MonetaryPolicy, SemanticRule, TimeBasis, allows_time_conversion,
    currency_eligible,
};
