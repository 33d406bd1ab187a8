// econorm-core/src/domain/normalization/normalizer.rs

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

use super::explain::{Explain, FxExplain, MagnitudeExplain, PeriodicityExplain, UnitsExplain};
use super::label::UnitLabel;
use super::resolve::{
    explicit_currency, resolve, resolve_currency, resolve_scale, resolve_time_scale,
};
use crate::domain::error::DomainError;
use crate::domain::fx::FxTable;
use crate::domain::record::BatchItem;
use crate::domain::semantics::{
    IndicatorType, TemporalAggregation, allows_time_conversion, currency_eligible,
};
use crate::domain::units::{ParsedUnit, Scale, TimeScale, UnitCategory, UnitParser};

/// Requested output dimensions. Absent dimensions are left as found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Targets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_scale: Option<TimeScale>,
}

impl Targets {
    pub fn is_empty(&self) -> bool {
        self.currency.is_none() && self.scale.is_none() && self.time_scale.is_none()
    }

    /// Keeps every dimension already set and fills the others from `fallback`.
    pub fn or(self, fallback: &Targets) -> Targets {
        Targets {
            currency: self.currency.or_else(|| fallback.currency.clone()),
            scale: self.scale.or(fallback.scale),
            time_scale: self.time_scale.or(fallback.time_scale),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub targets: Targets,
    pub fx: Option<Arc<FxTable>>,
    pub explicit_currency: Option<String>,
    pub explicit_scale: Option<String>,
    pub explicit_time_scale: Option<String>,
    pub indicator_type: Option<IndicatorType>,
    pub temporal_aggregation: Option<TemporalAggregation>,
    pub is_currency_denominated: Option<bool>,
    pub unit_type: Option<String>,
    pub explain: bool,
    pub fx_source: Option<String>,
    pub fx_source_id: Option<String>,
}

impl NormalizeOptions {
    /// Batch-level settings combined with one item's upstream metadata.
    pub fn for_item(&self, item: &BatchItem, targets: Targets) -> Self {
        Self {
            targets,
            fx: self.fx.clone(),
            explicit_currency: item.currency_code.clone(),
            explicit_scale: item.scale.clone(),
            explicit_time_scale: item.frequency_label().map(str::to_string),
            indicator_type: item.indicator_type,
            temporal_aggregation: item.temporal_aggregation,
            is_currency_denominated: item.is_currency_denominated,
            unit_type: item.unit_type.clone(),
            explain: self.explain,
            fx_source: self.fx_source.clone(),
            fx_source_id: self.fx_source_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationResult {
    pub normalized_value: f64,
    pub normalized_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<Explain>,
}

/// Parser plus conversion pipeline.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    parser: UnitParser,
}

impl Normalizer {
    pub fn new(parser: UnitParser) -> Self {
        Self { parser }
    }

    pub fn normalize(
        &self,
        value: f64,
        unit: &str,
        options: &NormalizeOptions,
    ) -> Result<NormalizationResult, DomainError> {
        let parsed = self.parser.parse(unit);
        normalize_parsed(value, unit, &parsed, options)
    }
}

/// Normalizes with the general parser only.
pub fn normalize_value(
    value: f64,
    unit: &str,
    options: &NormalizeOptions,
) -> Result<NormalizationResult, DomainError> {
    Normalizer::default().normalize(value, unit, options)
}

/// Conversion pipeline over an already parsed unit.
pub fn normalize_parsed(
    value: f64,
    unit: &str,
    parsed: &ParsedUnit,
    options: &NormalizeOptions,
) -> Result<NormalizationResult, DomainError> {
    if !value.is_finite() {
        return Err(DomainError::ItemProcessing {
            index: 0,
            message: format!("non-finite value {}", value),
        });
    }

    let original = unit.trim();
    let mut explain = Explain {
        units: UnitsExplain {
            original: original.to_string(),
            normalized: String::new(),
        },
        ..Default::default()
    };

    let currency = resolve_currency(options.explicit_currency.as_deref(), parsed.currency.as_deref());
    let any_currency = currency.is_some() || parsed.currency.is_some();

    // Indicator semantics decide before the unit text has to make sense.
    if let Some(reason) = indicator_passthrough(options.indicator_type, any_currency) {
        let label = passthrough_label(parsed.category, parsed, original);
        explain.step(format!("passthrough: {}", reason));
        return Ok(finish(value, label, explain, options.explain));
    }

    let category = effective_category(original, parsed, options)?;
    if category.is_passthrough() {
        let label = passthrough_label(category, parsed, original);
        explain.step(format!("passthrough: {} unit", category));
        return Ok(finish(value, label, explain, options.explain));
    }

    let mut result = value;

    // Currency
    let mut label_currency = currency
        .clone()
        .or_else(|| parsed.currency.as_ref().map(|_| "LCU".to_string()));
    let decision = currency_eligible(
        options.indicator_type,
        options.is_currency_denominated,
        currency.is_some(),
    );
    if decision.conflict {
        explain.step("fx: skipped, indicator type is never monetary");
    }
    if decision.eligible
        && let (Some(src), Some(target), Some(fx)) = (
            currency.as_deref(),
            options.targets.currency.as_deref(),
            options.fx.as_deref(),
        )
        && !src.eq_ignore_ascii_case(target)
    {
        let target = target.to_ascii_uppercase();
        let conversion = fx.convert(result, src, &target)?;
        trace!(src, target = %target, rate = conversion.rate, "fx applied");
        result = conversion.value;
        explain.step(format!("fx: {} -> {} at {}", src, target, conversion.rate));
        explain.fx = Some(FxExplain {
            currency: src.to_string(),
            target: target.clone(),
            rate: conversion.rate,
            base: fx.base.clone(),
            as_of: fx.rate_date(src).map(str::to_string).or_else(|| fx.as_of.clone()),
            source: options.fx_source.clone(),
            source_id: options.fx_source_id.clone(),
        });
        label_currency = Some(target);
    }

    // Magnitude
    let source_scale = resolve_scale(options.explicit_scale.as_deref(), parsed.scale);
    let mut label_scale = source_scale;
    if let Some(target) = options.targets.scale {
        let from = source_scale.unwrap_or(Scale::Ones);
        if from != target {
            let factor = from.factor_to(target);
            result *= factor;
            explain.step(format!("magnitude: {} -> {} (x{})", from, target, factor));
            explain.magnitude = Some(MagnitudeExplain {
                original_scale: from,
                target_scale: target,
                factor,
            });
        }
        label_scale = Some(target);
    }

    // Time
    let source_time = resolve_time_scale(options.explicit_time_scale.as_deref(), parsed.time_scale);
    let mut label_time = parsed.time_scale;
    if let Some(target) = options.targets.time_scale {
        let allowed = allows_time_conversion(options.indicator_type, options.temporal_aggregation);
        let periodicity = match source_time {
            _ if !allowed => PeriodicityExplain {
                original: source_time,
                target: Some(target),
                adjusted: false,
                factor: 1.0,
                description: blocked_reason(options),
            },
            None => PeriodicityExplain {
                original: None,
                target: Some(target),
                adjusted: false,
                factor: 1.0,
                description: "no source time scale".to_string(),
            },
            Some(from) if from == target => {
                label_time = Some(target);
                PeriodicityExplain {
                    original: Some(from),
                    target: Some(target),
                    adjusted: false,
                    factor: 1.0,
                    description: format!("already per {}", target),
                }
            }
            Some(from) => {
                let factor = from.factor_to(target);
                result *= factor;
                label_time = Some(target);
                PeriodicityExplain {
                    original: Some(from),
                    target: Some(target),
                    adjusted: true,
                    factor,
                    description: format!("per {} -> per {}", from, target),
                }
            }
        };
        explain.step(format!("time: {}", periodicity.description));
        explain.periodicity = Some(periodicity);
    }

    let base = match category {
        UnitCategory::Physical | UnitCategory::Energy | UnitCategory::Count => {
            parsed.normalized_label.as_deref().or_else(|| {
                // Category came from metadata; the raw text is the best base label.
                (parsed.is_unknown()
                    && parsed.scale.is_none()
                    && parsed.time_scale.is_none()
                    && !original.is_empty())
                .then_some(original)
            })
        }
        _ => None,
    };
    let label = UnitLabel {
        currency: label_currency.as_deref(),
        scale: label_scale,
        base,
        per_unit: parsed.per_unit.as_deref(),
        time_scale: label_time,
    }
    .render()
    .unwrap_or_else(|| "units".to_string());

    Ok(finish(result, label, explain, options.explain))
}

fn effective_category(
    original: &str,
    parsed: &ParsedUnit,
    options: &NormalizeOptions,
) -> Result<UnitCategory, DomainError> {
    if !parsed.is_unknown() {
        return Ok(parsed.category);
    }
    if let Some(category) = options
        .unit_type
        .as_deref()
        .and_then(UnitCategory::from_unit_type)
    {
        debug!(unit = original, %category, "category taken from unit_type");
        return Ok(category);
    }
    if explicit_currency(options.explicit_currency.as_deref()).is_some() {
        return Ok(UnitCategory::Currency);
    }
    if resolve::<Scale>(options.explicit_scale.as_deref(), None).is_some() {
        return Ok(UnitCategory::Count);
    }
    Err(DomainError::UnresolvableUnit {
        unit: original.to_string(),
    })
}

fn indicator_passthrough(
    indicator_type: Option<IndicatorType>,
    has_currency: bool,
) -> Option<&'static str> {
    match indicator_type {
        Some(IndicatorType::Sentiment) => Some("sentiment indicator"),
        Some(IndicatorType::Rate) if !has_currency => Some("dimensionless rate"),
        _ => None,
    }
}

/// Label for a value returned as found. Basis points keep their own label.
fn passthrough_label(category: UnitCategory, parsed: &ParsedUnit, original: &str) -> String {
    match (category, parsed.normalized_label.as_deref()) {
        (UnitCategory::Percentage | UnitCategory::Index, Some(label)) => label.to_string(),
        (UnitCategory::Percentage, None) => "%".to_string(),
        (UnitCategory::Index, None) => "index".to_string(),
        _ => original.to_string(),
    }
}

fn blocked_reason(options: &NormalizeOptions) -> String {
    match (options.temporal_aggregation, options.indicator_type) {
        (Some(aggregation), _) => format!("blocked by temporal aggregation {}", aggregation),
        (None, Some(t)) => format!("blocked by indicator type {}", t),
        (None, None) => "blocked".to_string(),
    }
}

fn finish(value: f64, label: String, mut explain: Explain, keep: bool) -> NormalizationResult {
    explain.units.normalized = label.clone();
    NormalizationResult {
        normalized_value: value,
        normalized_unit: label,
        explain: keep.then_some(explain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::CommodityUnits;
    use anyhow::Result;
    use std::collections::BTreeMap;

    fn fx() -> Arc<FxTable> {
        let mut rates = BTreeMap::new();
        rates.insert("EUR".to_string(), 0.85);
        rates.insert("GBP".to_string(), 0.79);
        Arc::new(FxTable::new("USD", rates).with_as_of("2025-01-31"))
    }

    fn targets(currency: Option<&str>, scale: Option<Scale>, time: Option<TimeScale>) -> Targets {
        Targets {
            currency: currency.map(str::to_string),
            scale,
            time_scale: time,
        }
    }

    #[test]
    fn test_eur_millions_per_year_to_usd_per_month() -> Result<()> {
        let options = NormalizeOptions {
            targets: targets(Some("USD"), Some(Scale::Millions), Some(TimeScale::Month)),
            fx: Some(fx()),
            ..Default::default()
        };
        let result = normalize_value(300.0, "EUR Millions per Year", &options)?;
        assert!((result.normalized_value - 29.41).abs() < 0.01);
        assert!((result.normalized_value - 300.0 / 0.85 / 12.0).abs() < 1e-9);
        assert_eq!(result.normalized_unit, "USD millions per month");
        Ok(())
    }

    #[test]
    fn test_cumulative_blocks_time_and_keeps_label() -> Result<()> {
        let options = NormalizeOptions {
            targets: targets(None, None, Some(TimeScale::Year)),
            temporal_aggregation: Some(TemporalAggregation::PeriodCumulative),
            ..Default::default()
        };
        let result = normalize_value(1000.0, "USD Million", &options)?;
        assert_eq!(result.normalized_value, 1000.0);
        assert_eq!(result.normalized_unit, "USD millions");
        Ok(())
    }

    #[test]
    fn test_count_period_total_magnitude_only() -> Result<()> {
        let options = NormalizeOptions {
            targets: targets(None, Some(Scale::Ones), Some(TimeScale::Month)),
            indicator_type: Some(IndicatorType::Count),
            temporal_aggregation: Some(TemporalAggregation::PeriodTotal),
            explain: true,
            ..Default::default()
        };
        let result = normalize_value(520394.0, "Thousands", &options)?;
        assert_eq!(result.normalized_value, 520_394_000.0);
        assert_eq!(result.normalized_unit, "units");

        let explain = result.explain.as_ref().map(|e| e.periodicity.clone());
        let periodicity = explain.flatten();
        assert!(periodicity.is_some_and(|p| !p.adjusted));
        Ok(())
    }

    #[test]
    fn test_blocked_time_keeps_original_suffix() -> Result<()> {
        let options = NormalizeOptions {
            targets: targets(None, None, Some(TimeScale::Month)),
            indicator_type: Some(IndicatorType::Stock),
            ..Default::default()
        };
        let result = normalize_value(12.0, "EUR Billions per Year", &options)?;
        assert_eq!(result.normalized_value, 12.0);
        assert_eq!(result.normalized_unit, "EUR billions per year");
        Ok(())
    }

    #[test]
    fn test_passthrough_categories() -> Result<()> {
        let options = NormalizeOptions {
            targets: targets(Some("EUR"), Some(Scale::Billions), Some(TimeScale::Month)),
            fx: Some(fx()),
            ..Default::default()
        };
        let pct = normalize_value(3.2, "% of GDP", &options)?;
        assert_eq!((pct.normalized_value, pct.normalized_unit.as_str()), (3.2, "%"));

        let idx = normalize_value(104.5, "2015=100", &options)?;
        assert_eq!((idx.normalized_value, idx.normalized_unit.as_str()), (104.5, "index"));

        let pair = normalize_value(278.0, "PKR/USD", &options)?;
        assert_eq!(pair.normalized_value, 278.0);
        assert_eq!(pair.normalized_unit, "PKR/USD");

        let sentiment = NormalizeOptions {
            indicator_type: Some(IndicatorType::Sentiment),
            ..options.clone()
        };
        let s = normalize_value(-12.0, "Points balance", &sentiment)?;
        assert_eq!(s.normalized_value, -12.0);

        let rate = NormalizeOptions {
            indicator_type: Some(IndicatorType::Rate),
            ..options
        };
        let r = normalize_value(4.5, "per year", &rate)?;
        assert_eq!((r.normalized_value, r.normalized_unit.as_str()), (4.5, "per year"));
        Ok(())
    }

    #[test]
    fn test_indicator_passthrough_ignores_unparseable_units() -> Result<()> {
        let sentiment = NormalizeOptions {
            targets: targets(Some("USD"), Some(Scale::Millions), Some(TimeScale::Month)),
            indicator_type: Some(IndicatorType::Sentiment),
            ..Default::default()
        };
        let s = normalize_value(-12.0, "net balance", &sentiment)?;
        assert_eq!((s.normalized_value, s.normalized_unit.as_str()), (-12.0, "net balance"));

        let rate = NormalizeOptions {
            indicator_type: Some(IndicatorType::Rate),
            ..sentiment.clone()
        };
        let r = normalize_value(4.5, "", &rate)?;
        assert_eq!((r.normalized_value, r.normalized_unit.as_str()), (4.5, ""));

        // Without the indicator type the same unit is still rejected.
        let plain = NormalizeOptions {
            indicator_type: None,
            ..sentiment
        };
        assert!(matches!(
            normalize_value(-12.0, "net balance", &plain),
            Err(DomainError::UnresolvableUnit { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_basis_points_keep_their_label() -> Result<()> {
        let options = NormalizeOptions {
            targets: targets(Some("USD"), Some(Scale::Millions), None),
            ..Default::default()
        };
        for unit in ["bps", "basis points"] {
            let result = normalize_value(25.0, unit, &options)?;
            assert_eq!(result.normalized_value, 25.0);
            assert_eq!(result.normalized_unit, "bps");
        }
        let pct = normalize_value(0.25, "percent", &options)?;
        assert_eq!(pct.normalized_unit, "%");
        Ok(())
    }

    #[test]
    fn test_non_monetary_types_never_fx_converted() -> Result<()> {
        for indicator in [IndicatorType::Count, IndicatorType::Volume] {
            let options = NormalizeOptions {
                targets: targets(Some("USD"), None, None),
                fx: Some(fx()),
                indicator_type: Some(indicator),
                is_currency_denominated: Some(true),
                explain: true,
                ..Default::default()
            };
            let result = normalize_value(100.0, "EUR", &options)?;
            assert_eq!(result.normalized_value, 100.0);
            assert!(result.explain.is_some_and(|e| e.fx.is_none()));
        }
        Ok(())
    }

    #[test]
    fn test_time_factors_are_exact() -> Result<()> {
        let options = NormalizeOptions {
            targets: targets(None, None, Some(TimeScale::Year)),
            ..Default::default()
        };
        let result = normalize_value(100.0, "USD per month", &options)?;
        assert_eq!(result.normalized_value, 1200.0);
        assert_eq!(result.normalized_unit, "USD per year");

        let result = normalize_value(10.0, "USD per quarter", &options)?;
        assert_eq!(result.normalized_value, 40.0);
        Ok(())
    }

    #[test]
    fn test_fx_round_trip() -> Result<()> {
        let to_usd = NormalizeOptions {
            targets: targets(Some("USD"), None, None),
            fx: Some(fx()),
            ..Default::default()
        };
        let there = normalize_value(987.654, "GBP", &to_usd)?;
        let to_gbp = NormalizeOptions {
            targets: targets(Some("GBP"), None, None),
            ..to_usd
        };
        let back = normalize_value(there.normalized_value, &there.normalized_unit, &to_gbp)?;
        assert!(((back.normalized_value - 987.654) / 987.654).abs() < 1e-9);
        assert_eq!(back.normalized_unit, "GBP");
        Ok(())
    }

    #[test]
    fn test_explicit_metadata_wins_except_hundred_millions() -> Result<()> {
        let options = NormalizeOptions {
            targets: targets(None, Some(Scale::Ones), None),
            explicit_scale: Some("Thousands".to_string()),
            ..Default::default()
        };
        let result = normalize_value(2.0, "USD Millions", &options)?;
        assert_eq!(result.normalized_value, 2000.0);

        let result = normalize_value(2.0, "CNY Hundred Million", &options)?;
        assert_eq!(result.normalized_value, 2e8);
        Ok(())
    }

    #[test]
    fn test_missing_rate_and_unresolvable_unit() {
        let options = NormalizeOptions {
            targets: targets(Some("USD"), None, None),
            fx: Some(fx()),
            ..Default::default()
        };
        assert!(matches!(
            normalize_value(1.0, "JPY Billions", &options),
            Err(DomainError::MissingExchangeRate { currency, .. }) if currency == "JPY"
        ));
        assert!(matches!(
            normalize_value(1.0, "widgets", &options),
            Err(DomainError::UnresolvableUnit { unit }) if unit == "widgets"
        ));
        assert!(matches!(
            normalize_value(f64::NAN, "USD", &options),
            Err(DomainError::ItemProcessing { .. })
        ));
    }

    #[test]
    fn test_metadata_fallbacks_for_unknown_units() -> Result<()> {
        let by_unit_type = NormalizeOptions {
            unit_type: Some("count".to_string()),
            ..Default::default()
        };
        let result = normalize_value(7.0, "widgets", &by_unit_type)?;
        assert_eq!(result.normalized_unit, "widgets");

        let by_currency = NormalizeOptions {
            targets: targets(Some("USD"), None, None),
            fx: Some(fx()),
            explicit_currency: Some("EUR".to_string()),
            ..Default::default()
        };
        let result = normalize_value(85.0, "", &by_currency)?;
        assert!((result.normalized_value - 100.0).abs() < 1e-9);
        assert_eq!(result.normalized_unit, "USD");
        Ok(())
    }

    #[test]
    fn test_domain_parser_units() -> Result<()> {
        let normalizer = Normalizer::new(UnitParser::new().with_domain(Arc::new(CommodityUnits)));
        let options = NormalizeOptions {
            targets: targets(None, Some(Scale::Ones), None),
            ..Default::default()
        };
        let result = normalizer.normalize(2.5, "Million bushels", &options)?;
        assert_eq!(result.normalized_value, 2_500_000.0);
        assert_eq!(result.normalized_unit, "bushel");
        Ok(())
    }

    #[test]
    fn test_explain_trail() -> Result<()> {
        let options = NormalizeOptions {
            targets: targets(Some("USD"), Some(Scale::Millions), Some(TimeScale::Month)),
            fx: Some(fx()),
            explain: true,
            fx_source: Some("snapshot".to_string()),
            ..Default::default()
        };
        let result = normalize_value(300.0, "EUR Billions per Quarter", &options)?;
        let explain = result
            .explain
            .ok_or_else(|| anyhow::anyhow!("explain requested"))?;
        let fx = explain.fx.ok_or_else(|| anyhow::anyhow!("fx applied"))?;
        assert_eq!(fx.base, "USD");
        assert_eq!(fx.as_of.as_deref(), Some("2025-01-31"));
        assert_eq!(fx.source.as_deref(), Some("snapshot"));
        assert!(explain.magnitude.is_some_and(|m| m.factor == 1000.0));
        assert!(explain.periodicity.is_some_and(|p| p.adjusted));
        assert_eq!(explain.steps.len(), 3);
        assert_eq!(explain.units.original, "EUR Billions per Quarter");
        assert_eq!(explain.units.normalized, "USD millions per month");
        Ok(())
    }

    #[test]
    fn test_local_currency_placeholder_is_not_converted() -> Result<()> {
        let options = NormalizeOptions {
            targets: targets(Some("USD"), None, None),
            fx: Some(fx()),
            ..Default::default()
        };
        let result = normalize_value(5.0, "National currency, Billions", &options)?;
        assert_eq!(result.normalized_value, 5.0);
        assert_eq!(result.normalized_unit, "LCU billions");
        Ok(())
    }
}
