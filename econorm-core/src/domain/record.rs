// econorm-core/src/domain/record.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::semantics::{IndicatorType, TemporalAggregation, deserialize_lenient};

/// One raw observation as delivered by the upstream classification stage.
/// Explicit fields win over whatever the `unit` text says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BatchItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Indicator / series key used to group items for auto-targeting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub value: f64,

    #[serde(default)]
    pub unit: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodicity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_frequency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator_type: Option<IndicatorType>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_lenient"
    )]
    pub temporal_aggregation: Option<TemporalAggregation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_currency_denominated: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Opaque side-channel. Carried through untouched, never inspected.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl BatchItem {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
            ..Default::default()
        }
    }

    /// Periodicity label, falling back to `reporting_frequency`.
    pub fn frequency_label(&self) -> Option<&str> {
        non_empty(self.periodicity.as_deref()).or_else(|| non_empty(self.reporting_frequency.as_deref()))
    }

    /// Key used to group related items; unnamed items share one group.
    pub fn group_key(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or("")
    }

    /// Human-readable handle for logs.
    pub fn label(&self) -> String {
        match (&self.id, &self.name) {
            (Some(id), _) => id.clone(),
            (None, Some(name)) => name.clone(),
            (None, None) => format!("{} {}", self.value, self.unit),
        }
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
