// econorm-core/src/application/result.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::normalization::Explain;
use crate::domain::quality::QualityScore;
use crate::domain::record::BatchItem;
use crate::domain::targets::AutoTargetResult;

pub const QUALITY_SKIP_REASON: &str = "failed quality validation";
pub const CANCELLED_SKIP_REASON: &str = "cancelled";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    /// Position in the submitted batch.
    pub index: usize,
    pub item: BatchItem,
    pub normalized_value: f64,
    pub normalized_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<Explain>,
    /// The caller's default was substituted after a failure.
    #[serde(default)]
    pub defaulted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedItem {
    pub index: usize,
    pub item: BatchItem,
    pub error: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub index: usize,
    pub item: BatchItem,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    /// Items that went through normalization: `successful + failed`.
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub elapsed_ms: u64,
    pub average_ms_per_item: f64,
    /// Runs performed, retries included.
    pub attempts: u32,
}

impl BatchStats {
    pub(crate) fn tally(
        total: usize,
        successful: usize,
        failed: usize,
        skipped: usize,
        elapsed_ms: u64,
        attempts: u32,
    ) -> Self {
        let processed = successful + failed;
        let average_ms_per_item = if processed == 0 {
            0.0
        } else {
            elapsed_ms as f64 / processed as f64
        };
        Self {
            total,
            processed,
            successful,
            failed,
            skipped,
            elapsed_ms,
            average_ms_per_item,
            attempts,
        }
    }
}

/// Snapshot handed to progress callbacks after every recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Outcomes recorded so far, skipped items included.
    pub processed: usize,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub successful: Vec<NormalizedItem>,
    pub failed: Vec<FailedItem>,
    pub skipped: Vec<SkippedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityScore>,
    /// Selected targets per indicator group.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub auto_targets: BTreeMap<String, AutoTargetResult>,
    pub stats: BatchStats,
}

impl BatchResult {
    /// Every submitted item lands in exactly one partition.
    pub fn is_complete(&self) -> bool {
        self.successful.len() + self.failed.len() + self.skipped.len() == self.stats.total
    }

    /// Successful values in submission order.
    pub fn values(&self) -> Vec<f64> {
        let mut ordered: Vec<&NormalizedItem> = self.successful.iter().collect();
        ordered.sort_by_key(|n| n.index);
        ordered.iter().map(|n| n.normalized_value).collect()
    }
}
