// econorm-core/src/application/gate.rs

use std::collections::BTreeSet;
use tracing::{info, warn};

use super::options::{BatchOptions, ErrorPolicy};
use super::result::{QUALITY_SKIP_REASON, SkippedItem};
use crate::domain::error::DomainError;
use crate::domain::quality::{DataPoint, QualityAssessor, QualityScore};
use crate::domain::record::BatchItem;

pub(crate) struct GateOutcome {
    pub score: QualityScore,
    /// Items barred from normalization.
    pub rejected: BTreeSet<usize>,
}

impl GateOutcome {
    pub fn skipped(&self, items: &[BatchItem]) -> Vec<SkippedItem> {
        self.rejected
            .iter()
            .filter_map(|&index| {
                items.get(index).map(|item| SkippedItem {
                    index,
                    item: item.clone(),
                    reason: QUALITY_SKIP_REASON.to_string(),
                })
            })
            .collect()
    }
}

/// Scores the batch and decides which items may proceed.
pub(crate) fn quality_gate(
    items: &[BatchItem],
    options: &BatchOptions,
) -> Result<GateOutcome, DomainError> {
    let points: Vec<DataPoint> = items.iter().map(DataPoint::from).collect();
    let assessor =
        QualityAssessor::new(options.quality.clone()).with_parser(options.parser.clone());
    let score = assessor.assess(&points);

    if score.overall >= options.quality_threshold {
        info!(score = score.overall, "quality gate passed");
        return Ok(GateOutcome {
            score,
            rejected: BTreeSet::new(),
        });
    }

    if options.handle_errors == ErrorPolicy::Throw {
        return Err(DomainError::QualityBelowThreshold {
            score: score.overall,
            threshold: options.quality_threshold,
        });
    }

    let flagged: BTreeSet<usize> = score
        .flagged_indices()
        .into_iter()
        .filter(|i| *i < items.len())
        .collect();
    let rejected = if flagged.is_empty() {
        (0..items.len()).collect()
    } else {
        flagged
    };
    warn!(
        score = score.overall,
        threshold = options.quality_threshold,
        rejected = rejected.len(),
        "quality gate failed"
    );
    Ok(GateOutcome { score, rejected })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(policy: ErrorPolicy, threshold: u8) -> BatchOptions {
        BatchOptions {
            validate: true,
            handle_errors: policy,
            quality_threshold: threshold,
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_batch_passes() -> anyhow::Result<()> {
        let items: Vec<BatchItem> = [10.0, 11.0, 12.0]
            .into_iter()
            .map(|v| BatchItem::new(v, "USD millions"))
            .collect();
        let outcome = quality_gate(&items, &options(ErrorPolicy::Skip, 50))?;
        assert!(outcome.rejected.is_empty());
        assert!(outcome.skipped(&items).is_empty());
        Ok(())
    }

    #[test]
    fn test_throw_policy_aborts() {
        let items = vec![BatchItem::new(1.0, "")];
        let result = quality_gate(&items, &options(ErrorPolicy::Throw, 100));
        assert!(matches!(
            result,
            Err(DomainError::QualityBelowThreshold { threshold: 100, .. })
        ));
    }

    #[test]
    fn test_skip_policy_rejects_flagged_items() -> anyhow::Result<()> {
        let items = vec![
            BatchItem::new(1.0, "USD"),
            BatchItem::new(f64::INFINITY, "USD"),
            BatchItem::new(2.0, "USD"),
        ];
        let outcome = quality_gate(&items, &options(ErrorPolicy::Skip, 100))?;
        assert!(outcome.rejected.contains(&1));
        assert!(!outcome.rejected.contains(&0));
        let skipped = outcome.skipped(&items);
        assert!(skipped.iter().all(|s| s.reason == QUALITY_SKIP_REASON));
        Ok(())
    }

    #[test]
    fn test_nothing_singled_out_rejects_everything() -> anyhow::Result<()> {
        let items = vec![BatchItem::new(1.0, "USD"), BatchItem::new(2.0, "USD")];
        // Missing sources are low severity: the score drops but no item is blamed.
        let mut opts = options(ErrorPolicy::Skip, 100);
        opts.quality.required_fields = vec![crate::domain::quality::RequiredField::Source];
        let outcome = quality_gate(&items, &opts)?;
        assert!(outcome.score.overall < 100);
        assert!(outcome.score.flagged_indices().is_empty());
        assert_eq!(outcome.rejected.len(), 2);
        Ok(())
    }
}
