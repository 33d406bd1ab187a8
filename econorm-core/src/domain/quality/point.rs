// econorm-core/src/domain/quality/point.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::record::BatchItem;

/// The slice of a record the quality assessor looks at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl DataPoint {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            unit: Some(unit.into()),
            ..Default::default()
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Unit text, if present and non-blank.
    pub fn unit_text(&self) -> Option<&str> {
        self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

impl From<&BatchItem> for DataPoint {
    fn from(item: &BatchItem) -> Self {
        Self {
            value: Some(item.value),
            unit: Some(item.unit.clone()),
            timestamp: item.timestamp,
            source: item.source.clone(),
        }
    }
}
