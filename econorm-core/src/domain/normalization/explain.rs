// econorm-core/src/domain/normalization/explain.rs

use serde::{Deserialize, Serialize};

use crate::domain::units::{Scale, TimeScale};

/// Audit trail for one normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Explain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx: Option<FxExplain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<MagnitudeExplain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodicity: Option<PeriodicityExplain>,
    pub units: UnitsExplain,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxExplain {
    pub currency: String,
    pub target: String,
    pub rate: f64,
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagnitudeExplain {
    pub original_scale: Scale,
    pub target_scale: Scale,
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodicityExplain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<TimeScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TimeScale>,
    pub adjusted: bool,
    pub factor: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UnitsExplain {
    pub original: String,
    pub normalized: String,
}

impl Explain {
    pub(crate) fn step(&mut self, text: impl Into<String>) {
        self.steps.push(text.into());
    }
}
