// econorm-core/src/application/batch.rs

use futures::future::{join_all, try_join_all};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use super::cache::ParsedUnitCache;
use super::collector::{Collector, Outcome, ProgressFn};
use super::gate::quality_gate;
use super::options::{BatchOptions, ErrorPolicy};
use super::result::{
    BatchResult, BatchStats, CANCELLED_SKIP_REASON, FailedItem, NormalizedItem, Progress,
    SkippedItem,
};
use crate::domain::error::DomainError;
use crate::domain::normalization::{
    NormalizationResult, NormalizeOptions, Targets, normalize_parsed,
};
use crate::domain::record::BatchItem;
use crate::domain::targets::{AutoTargetResult, group_by_indicator, select_targets};
use crate::error::EconormError;

/// Normalizes a batch with the configured error policy.
#[instrument(skip_all, fields(total = items.len(), policy = options.handle_errors.as_str(), concurrency = options.chunk_size()))]
pub async fn process_batch(
    items: &[BatchItem],
    options: &BatchOptions,
) -> Result<BatchResult, EconormError> {
    let mut ignore = |_: Progress| {};
    run_batch(items, options, None, &mut ignore).await
}

/// Same as [`process_batch`], reporting progress after every recorded item.
#[instrument(skip_all, fields(total = items.len(), policy = options.handle_errors.as_str(), concurrency = options.chunk_size()))]
pub async fn process_batch_with_progress<F>(
    items: &[BatchItem],
    options: &BatchOptions,
    mut on_progress: F,
) -> Result<BatchResult, EconormError>
where
    F: FnMut(Progress) + Send,
{
    run_batch(items, options, None, &mut on_progress).await
}

/// Batch run. `fixed_targets`, when given, holds one target set per item and
/// replaces both explicit and inferred targets.
pub(crate) async fn run_batch(
    items: &[BatchItem],
    options: &BatchOptions,
    fixed_targets: Option<Vec<Targets>>,
    on_progress: ProgressFn<'_>,
) -> Result<BatchResult, EconormError> {
    let started = Instant::now();
    options.check()?;

    // An empty batch still goes through the gate: it scores 0 with a `no_data` issue.
    let mut quality = None;
    let mut rejected = Vec::new();
    if options.validate {
        let gate = quality_gate(items, options)?;
        rejected = gate.skipped(items);
        quality = Some(gate.score);
    }

    if items.is_empty() {
        debug!("empty batch");
        return Ok(BatchResult {
            quality,
            stats: BatchStats::tally(0, 0, 0, 0, 0, 1),
            ..Default::default()
        });
    }

    let cache = Arc::new(ParsedUnitCache::build(
        items.iter().map(|i| i.unit.as_str()),
        &options.parser,
    ));
    let barred: BTreeSet<usize> = rejected.iter().map(|s| s.index).collect();

    let (targets, auto_targets) = match fixed_targets {
        Some(targets) if targets.len() == items.len() => (targets, BTreeMap::new()),
        Some(targets) => {
            return Err(EconormError::Internal(format!(
                "{} target sets for {} items",
                targets.len(),
                items.len()
            )));
        }
        None => plan_targets(items, &cache, options),
    };

    let pending: Vec<usize> = (0..items.len()).filter(|i| !barred.contains(i)).collect();
    let ctx = WorkerContext {
        items,
        options,
        cache,
        targets: &targets,
        base: options.normalize_options(),
    };

    let mut collector = Collector::new(items.len(), on_progress);
    for skipped in rejected {
        collector.record(Outcome::Skipped(skipped));
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let (produced, ()) = tokio::join!(produce(&ctx, &pending, tx), collector.drain(rx));
    produced?;

    let parts = collector.finish();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let stats = BatchStats::tally(
        items.len(),
        parts.successful.len(),
        parts.failed.len(),
        parts.skipped.len(),
        elapsed_ms,
        1,
    );
    info!(
        successful = stats.successful,
        failed = stats.failed,
        skipped = stats.skipped,
        elapsed_ms,
        "batch finished"
    );

    Ok(BatchResult {
        successful: parts.successful,
        failed: parts.failed,
        skipped: parts.skipped,
        quality,
        auto_targets,
        stats,
    })
}

/// Per-item targets. With auto-targeting on, each indicator group gets its
/// own selection and explicit batch targets win per dimension.
pub(crate) fn plan_targets(
    items: &[BatchItem],
    cache: &ParsedUnitCache,
    options: &BatchOptions,
) -> (Vec<Targets>, BTreeMap<String, AutoTargetResult>) {
    let explicit = options.targets();
    let mut per_item = vec![explicit.clone(); items.len()];
    let mut selected = BTreeMap::new();
    let Some(config) = options.auto_target.as_ref() else {
        return (per_item, selected);
    };

    for (group, indices) in group_by_indicator(items) {
        let parsed: Vec<_> = indices
            .iter()
            .map(|&i| cache.parsed(&items[i].unit, &options.parser))
            .collect();
        let observations = indices
            .iter()
            .zip(parsed.iter())
            .map(|(&i, p)| (&items[i], &**p));
        let result = select_targets(observations, config, &explicit);
        let targets = explicit.clone().or(&result.targets());
        debug!(group = %group, targets = ?targets, "auto targets selected");
        if result.used_fallback() {
            warn!(group = %group, reasons = ?result.fallback_reasons(), "auto target fallback");
        }
        for &i in &indices {
            per_item[i] = targets.clone();
        }
        selected.insert(group, result);
    }
    (per_item, selected)
}

/// Everything a worker reads. Shared by reference across one chunk.
struct WorkerContext<'a> {
    items: &'a [BatchItem],
    options: &'a BatchOptions,
    cache: Arc<ParsedUnitCache>,
    targets: &'a [Targets],
    base: NormalizeOptions,
}

impl WorkerContext<'_> {
    fn normalize(&self, index: usize) -> Result<NormalizationResult, DomainError> {
        let item = &self.items[index];
        let parsed = self.cache.parsed(&item.unit, &self.options.parser);
        let opts = self.base.for_item(item, self.targets[index].clone());
        normalize_parsed(item.value, &item.unit, &parsed, &opts)
    }

    /// Applies the error policy. Only `throw` ever returns an error.
    fn process(&self, index: usize) -> Result<Outcome, EconormError> {
        let item = &self.items[index];
        match self.normalize(index) {
            Ok(result) => Ok(Outcome::Normalized(NormalizedItem {
                index,
                item: item.clone(),
                normalized_value: result.normalized_value,
                normalized_unit: result.normalized_unit,
                explain: result.explain,
                defaulted: false,
            })),
            Err(err) => {
                let err = err.at_index(index);
                match self.options.handle_errors {
                    ErrorPolicy::Throw => {
                        error!(index, error = %err, "item failed, aborting batch");
                        Err(err.into())
                    }
                    ErrorPolicy::Skip => {
                        warn!(index, reason = err.reason(), "item failed");
                        Ok(Outcome::Failed(FailedItem {
                            index,
                            item: item.clone(),
                            error: err.to_string(),
                            reason: err.reason().to_string(),
                        }))
                    }
                    ErrorPolicy::Default => {
                        debug!(index, reason = err.reason(), "item failed, using default");
                        Ok(Outcome::Normalized(default_outcome(index, item, self.options)))
                    }
                }
            }
        }
    }

    async fn dispatch(
        &self,
        index: usize,
        tx: &mpsc::UnboundedSender<Outcome>,
    ) -> Result<(), EconormError> {
        let outcome = self.process(index)?;
        // The collector outlives the producer; a closed channel means it is gone.
        tx.send(outcome)
            .map_err(|_| EconormError::Internal("outcome collector closed".into()))
    }
}

pub(crate) fn default_outcome(
    index: usize,
    item: &BatchItem,
    options: &BatchOptions,
) -> NormalizedItem {
    let unit = if options.default_unit.trim().is_empty() {
        item.unit.clone()
    } else {
        options.default_unit.clone()
    };
    NormalizedItem {
        index,
        item: item.clone(),
        normalized_value: options.default_value,
        normalized_unit: unit,
        explain: None,
        defaulted: true,
    }
}

/// Dispatches `pending` chunk by chunk. A chunk is fully collected before the
/// next one starts; cancellation is checked in between.
///
/// Workers of a chunk are futures polled together on the caller's task, not
/// threads. Normalizing one item never awaits, so `parallel` bounds how many
/// outcomes are in flight between collector turns rather than adding CPU
/// parallelism. Callers that need several cores run separate batches on
/// separate tasks.
async fn produce(
    ctx: &WorkerContext<'_>,
    pending: &[usize],
    tx: mpsc::UnboundedSender<Outcome>,
) -> Result<(), EconormError> {
    let chunk_size = ctx.options.chunk_size();
    for (n, chunk) in pending.chunks(chunk_size).enumerate() {
        if ctx.options.is_cancelled() {
            let remaining = &pending[n * chunk_size..];
            info!(remaining = remaining.len(), "batch cancelled");
            for &index in remaining {
                let _ = tx.send(Outcome::Skipped(SkippedItem {
                    index,
                    item: ctx.items[index].clone(),
                    reason: CANCELLED_SKIP_REASON.to_string(),
                }));
            }
            return Ok(());
        }

        let workers = chunk.iter().map(|&index| ctx.dispatch(index, &tx));
        if ctx.options.handle_errors == ErrorPolicy::Throw {
            try_join_all(workers).await?;
        } else {
            for outcome in join_all(workers).await {
                outcome?;
            }
        }
        // Let the collector catch up before the next chunk.
        tokio::task::yield_now().await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quality::IssueKind;
    use crate::domain::targets::AutoTargetConfig;
    use crate::domain::units::{Scale, TimeScale};

    fn item(name: &str, value: f64, unit: &str) -> BatchItem {
        BatchItem {
            name: Some(name.into()),
            ..BatchItem::new(value, unit)
        }
    }

    #[tokio::test]
    async fn test_skip_policy_records_failures() -> anyhow::Result<()> {
        let items = vec![BatchItem::new(5.0, "%"), BatchItem::new(1.0, "zorkmids")];
        let result = process_batch(&items, &BatchOptions::default()).await?;
        assert_eq!(result.successful.len(), 1);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].index, 1);
        assert_eq!(result.failed[0].reason, "unresolvable_unit");
        assert!(result.is_complete());
        Ok(())
    }

    #[tokio::test]
    async fn test_default_policy_substitutes() -> anyhow::Result<()> {
        let items = vec![BatchItem::new(1.0, "zorkmids")];
        let options = BatchOptions {
            handle_errors: ErrorPolicy::Default,
            default_value: -1.0,
            default_unit: "n/a".into(),
            ..Default::default()
        };
        let result = process_batch(&items, &options).await?;
        assert_eq!(result.successful.len(), 1);
        assert!(result.successful[0].defaulted);
        assert_eq!(result.successful[0].normalized_value, -1.0);
        assert_eq!(result.successful[0].normalized_unit, "n/a");
        assert_eq!(result.stats.failed, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_throw_policy_aborts() {
        let items = vec![BatchItem::new(5.0, "%"), BatchItem::new(1.0, "zorkmids")];
        let options = BatchOptions {
            handle_errors: ErrorPolicy::Throw,
            ..Default::default()
        };
        let result = process_batch(&items, &options).await;
        assert!(matches!(
            result,
            Err(EconormError::Domain(DomainError::UnresolvableUnit { .. }))
        ));
    }

    #[tokio::test]
    async fn test_empty_batch() -> anyhow::Result<()> {
        let result = process_batch(&[], &BatchOptions::default()).await?;
        assert_eq!(result.stats.total, 0);
        assert!(result.is_complete());
        assert!(result.quality.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_batch_fails_the_gate() -> anyhow::Result<()> {
        let strict = BatchOptions {
            validate: true,
            handle_errors: ErrorPolicy::Throw,
            ..Default::default()
        };
        let err = process_batch(&[], &strict).await.err();
        assert!(matches!(
            err,
            Some(EconormError::Domain(DomainError::QualityBelowThreshold { score: 0, .. }))
        ));

        let lenient = BatchOptions {
            handle_errors: ErrorPolicy::Skip,
            ..strict
        };
        let result = process_batch(&[], &lenient).await?;
        let quality = result.quality.as_ref().map(|q| (q.overall, q.issues[0].kind));
        assert_eq!(quality, Some((0, IssueKind::NoData)));
        assert_eq!(result.stats.total, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_parallel_chunks_settle_whole() -> anyhow::Result<()> {
        let items: Vec<BatchItem> = (0..10).map(|i| BatchItem::new(f64::from(i), "USD")).collect();
        let token = tokio_util::sync::CancellationToken::new();
        let options = BatchOptions {
            parallel: true,
            concurrency: 4,
            cancellation: Some(token.clone()),
            ..Default::default()
        };

        let result = process_batch_with_progress(&items, &options, move |p| {
            if p.processed == 1 {
                token.cancel();
            }
        })
        .await?;

        // Cancellation lands between chunks, never inside one.
        assert_eq!(result.successful.len() % 4, 0);
        assert!(!result.successful.is_empty());
        assert!(!result.skipped.is_empty());
        assert_eq!(result.successful.len() + result.skipped.len(), 10);
        Ok(())
    }

    #[test]
    fn test_plan_targets_per_group() {
        let items = vec![
            item("gdp", 1.0, "USD millions"),
            item("gdp", 2.0, "USD millions"),
            item("gdp", 3.0, "EUR millions"),
            item("cpi", 4.0, "EUR billions"),
        ];
        let options = BatchOptions {
            to_time_scale: Some(TimeScale::Year),
            auto_target: Some(AutoTargetConfig::default()),
            ..Default::default()
        };
        let cache = ParsedUnitCache::build(items.iter().map(|i| i.unit.as_str()), &options.parser);
        let (targets, selected) = plan_targets(&items, &cache, &options);

        assert_eq!(selected.len(), 2);
        assert_eq!(targets[0].currency.as_deref(), Some("USD"));
        assert_eq!(targets[0].scale, Some(Scale::Millions));
        assert_eq!(targets[3].currency.as_deref(), Some("EUR"));
        assert_eq!(targets[3].scale, Some(Scale::Billions));
        assert!(targets.iter().all(|t| t.time_scale == Some(TimeScale::Year)));
    }

    #[test]
    fn test_plan_targets_without_auto() {
        let items = vec![item("gdp", 1.0, "USD")];
        let options = BatchOptions {
            to_currency: Some("eur".into()),
            ..Default::default()
        };
        let cache = ParsedUnitCache::default();
        let (targets, selected) = plan_targets(&items, &cache, &options);
        assert!(selected.is_empty());
        assert_eq!(targets[0].currency.as_deref(), Some("EUR"));
    }
}
