// econorm-core/src/domain/targets/auto_target.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::debug;
use validator::Validate;

use crate::domain::normalization::{Targets, resolve_currency, resolve_scale, resolve_time_scale};
use crate::domain::record::BatchItem;
use crate::domain::units::{ParsedUnit, Scale, TimeScale};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_SCALE: Scale = Scale::Millions;
pub const DEFAULT_TIME_SCALE: TimeScale = TimeScale::Month;

/// What to pick when no value dominates a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreaker {
    /// The caller's explicit target, if any.
    #[default]
    PreferTarget,
    /// USD / millions / month.
    PreferDefault,
    /// Leave the dimension untouched.
    None,
}

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct AutoTargetConfig {
    #[serde(default = "default_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: f64,
    #[serde(default)]
    pub tie_breaker: TieBreaker,
}

impl Default for AutoTargetConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            tie_breaker: TieBreaker::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de> + Ord"))]
pub struct DimensionChoice<T> {
    pub selected: Option<T>,
    /// Share of the group's items carrying the winning value.
    pub dominance: f64,
    pub counts: BTreeMap<T, usize>,
    pub used_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoTargetResult {
    pub currency: DimensionChoice<String>,
    pub scale: DimensionChoice<Scale>,
    pub time_scale: DimensionChoice<TimeScale>,
}

impl AutoTargetResult {
    pub fn targets(&self) -> Targets {
        Targets {
            currency: self.currency.selected.clone(),
            scale: self.scale.selected,
            time_scale: self.time_scale.selected,
        }
    }

    pub fn used_fallback(&self) -> bool {
        self.currency.used_fallback || self.scale.used_fallback || self.time_scale.used_fallback
    }

    /// Fallback reasons, one per dimension that needed one.
    pub fn fallback_reasons(&self) -> Vec<String> {
        [
            self.currency.reason.as_ref(),
            self.scale.reason.as_ref(),
            self.time_scale.reason.as_ref(),
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }
}

/// Picks the dominant currency, scale and time scale among related items.
pub fn select_targets<'a>(
    observations: impl IntoIterator<Item = (&'a BatchItem, &'a ParsedUnit)>,
    config: &AutoTargetConfig,
    caller: &Targets,
) -> AutoTargetResult {
    let mut currencies: BTreeMap<String, usize> = BTreeMap::new();
    let mut scales: BTreeMap<Scale, usize> = BTreeMap::new();
    let mut times: BTreeMap<TimeScale, usize> = BTreeMap::new();
    let mut group_size = 0;

    for (item, parsed) in observations {
        group_size += 1;
        if let Some(c) = resolve_currency(item.currency_code.as_deref(), parsed.currency.as_deref()) {
            *currencies.entry(c).or_default() += 1;
        }
        if let Some(s) = resolve_scale(item.scale.as_deref(), parsed.scale) {
            *scales.entry(s).or_default() += 1;
        }
        if let Some(t) = resolve_time_scale(item.frequency_label(), parsed.time_scale) {
            *times.entry(t).or_default() += 1;
        }
    }

    let tie_breaker = config.tie_breaker;
    let result = AutoTargetResult {
        currency: choose(
            "currency",
            currencies,
            group_size,
            config.threshold,
            fallback_for(tie_breaker, caller.currency.clone(), DEFAULT_CURRENCY.to_string()),
        ),
        scale: choose(
            "scale",
            scales,
            group_size,
            config.threshold,
            fallback_for(tie_breaker, caller.scale, DEFAULT_SCALE),
        ),
        time_scale: choose(
            "time scale",
            times,
            group_size,
            config.threshold,
            fallback_for(tie_breaker, caller.time_scale, DEFAULT_TIME_SCALE),
        ),
    };
    debug!(targets = ?result.targets(), fallback = result.used_fallback(), "auto-targets selected");
    result
}

fn fallback_for<T>(tie_breaker: TieBreaker, caller: Option<T>, default: T) -> Option<T> {
    match tie_breaker {
        TieBreaker::PreferTarget => caller,
        TieBreaker::PreferDefault => Some(default),
        TieBreaker::None => None,
    }
}

fn choose<T: Ord + Clone + Display>(
    dimension: &str,
    counts: BTreeMap<T, usize>,
    group_size: usize,
    threshold: f64,
    fallback: Option<T>,
) -> DimensionChoice<T> {
    // Items missing the dimension still count against the leader.
    let total = group_size.max(counts.values().sum());
    let top = counts.values().copied().max().unwrap_or(0);
    let leaders: Vec<&T> = counts.iter().filter(|(_, n)| **n == top).map(|(k, _)| k).collect();
    let dominance = if total == 0 { 0.0 } else { top as f64 / total as f64 };

    let reason = match leaders.as_slice() {
        [] => Some(format!("no item carries a {}", dimension)),
        [winner] if dominance >= threshold => {
            return DimensionChoice {
                selected: Some((*winner).clone()),
                dominance,
                counts,
                used_fallback: false,
                reason: None,
            };
        }
        [winner] => Some(format!(
            "{} {} below threshold ({:.2} < {:.2})",
            dimension, winner, dominance, threshold
        )),
        tied => Some(format!(
            "{} tie between {}",
            dimension,
            tied.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
        )),
    };

    DimensionChoice {
        selected: fallback,
        dominance,
        counts,
        used_fallback: true,
        reason,
    }
}

/// Item positions grouped by indicator key; unnamed items share the "" group.
pub fn group_by_indicator(items: &[BatchItem]) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, item) in items.iter().enumerate() {
        groups.entry(item.group_key().to_string()).or_default().push(index);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::parse_unit;

    fn select(units: &[&str], config: &AutoTargetConfig, caller: &Targets) -> AutoTargetResult {
        let items: Vec<BatchItem> = units.iter().map(|u| BatchItem::new(1.0, *u)).collect();
        let parsed: Vec<ParsedUnit> = units.iter().map(|u| parse_unit(u)).collect();
        select_targets(items.iter().zip(parsed.iter()), config, caller)
    }

    #[test]
    fn test_dominant_currency() {
        let mut units = vec!["USD Millions"; 7];
        units.extend(["EUR Millions"; 3]);
        let result = select(&units, &AutoTargetConfig::default(), &Targets::default());
        assert_eq!(result.currency.selected.as_deref(), Some("USD"));
        assert!((result.currency.dominance - 0.7).abs() < 1e-12);
        assert!(!result.currency.used_fallback);
        assert_eq!(result.scale.selected, Some(Scale::Millions));
        assert!(result.time_scale.used_fallback);
        assert_eq!(result.time_scale.selected, None);
    }

    #[test]
    fn test_share_counts_the_whole_group() {
        let mut units = vec!["USD Millions"; 3];
        units.extend(["Thousands"; 7]);
        let result = select(&units, &AutoTargetConfig::default(), &Targets::default());
        assert!((result.currency.dominance - 0.3).abs() < 1e-12);
        assert!(result.currency.used_fallback);
        assert_eq!(result.currency.selected, None);
        assert!(
            result
                .currency
                .reason
                .as_deref()
                .is_some_and(|r| r.contains("below threshold"))
        );

        // Every item carries a scale, so the same group still has a winner.
        assert_eq!(result.scale.selected, Some(Scale::Thousands));
        assert!((result.scale.dominance - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_choice_round_trips_through_json() -> anyhow::Result<()> {
        let units = ["USD Millions", "USD Millions", "EUR Millions"];
        let result = select(&units, &AutoTargetConfig::default(), &Targets::default());
        let json = serde_json::to_string(&result)?;
        let back: AutoTargetResult = serde_json::from_str(&json)?;
        assert_eq!(back.currency.counts.get("USD"), Some(&2));
        assert_eq!(back.scale.selected, Some(Scale::Millions));
        Ok(())
    }

    #[test]
    fn test_tie_breakers() {
        let units = ["USD per month", "EUR per month", "USD per quarter", "EUR per quarter"];
        let defaults = AutoTargetConfig {
            tie_breaker: TieBreaker::PreferDefault,
            ..Default::default()
        };
        let result = select(&units, &defaults, &Targets::default());
        assert_eq!(result.currency.selected.as_deref(), Some(DEFAULT_CURRENCY));
        assert!(result.currency.used_fallback);
        assert!(result.currency.reason.as_deref().is_some_and(|r| r.contains("tie")));
        assert_eq!(result.time_scale.selected, Some(DEFAULT_TIME_SCALE));

        let caller = Targets {
            currency: Some("GBP".into()),
            ..Default::default()
        };
        let result = select(&units, &AutoTargetConfig::default(), &caller);
        assert_eq!(result.currency.selected.as_deref(), Some("GBP"));
        assert_eq!(result.time_scale.selected, None);

        let none = AutoTargetConfig {
            tie_breaker: TieBreaker::None,
            ..Default::default()
        };
        let result = select(&units, &none, &caller);
        assert_eq!(result.currency.selected, None);
        assert_eq!(result.fallback_reasons().len(), 3);
    }

    #[test]
    fn test_threshold_applies_to_unique_leader() {
        let units = ["USD", "USD", "EUR", "GBP", "JPY"];
        let strict = AutoTargetConfig {
            threshold: 0.5,
            tie_breaker: TieBreaker::None,
        };
        let result = select(&units, &strict, &Targets::default());
        assert_eq!(result.currency.selected, None);
        assert!((result.currency.dominance - 0.4).abs() < 1e-12);

        let lenient = AutoTargetConfig {
            threshold: 0.4,
            ..strict
        };
        let result = select(&units, &lenient, &Targets::default());
        assert_eq!(result.currency.selected.as_deref(), Some("USD"));
    }

    #[test]
    fn test_grouping() {
        let mut a = BatchItem::new(1.0, "USD");
        a.name = Some("GDP".into());
        let b = BatchItem::new(2.0, "USD");
        let mut c = BatchItem::new(3.0, "EUR");
        c.name = Some("GDP".into());
        let groups = group_by_indicator(&[a, b, c]);
        assert_eq!(groups.get("GDP"), Some(&vec![0, 2]));
        assert_eq!(groups.get(""), Some(&vec![1]));
    }
}
