// econorm-core/src/application/retry.rs

use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, instrument};
use validator::Validate;

use super::batch::run_batch;
use super::options::{BatchOptions, RetryPolicy};
use super::result::{BatchResult, BatchStats, FailedItem, Progress};
use crate::domain::normalization::Targets;
use crate::domain::record::BatchItem;
use crate::domain::targets::AutoTargetResult;
use crate::error::EconormError;

/// Runs the batch, then resubmits the failed subset with exponential backoff
/// until nothing fails or `max_attempts` runs have been made.
///
/// Retried items keep the targets selected for their group in the first run,
/// and the quality gate is not re-applied to them.
#[instrument(skip_all, fields(total = items.len(), max_attempts = policy.max_attempts))]
pub async fn process_batch_with_retry(
    items: &[BatchItem],
    options: &BatchOptions,
    policy: RetryPolicy,
) -> Result<BatchResult, EconormError> {
    policy
        .validate()
        .map_err(|e| EconormError::InvalidOptions(e.to_string()))?;

    let started = Instant::now();
    let mut ignore = |_: Progress| {};
    let mut result = run_batch(items, options, None, &mut ignore).await?;

    let explicit = options.targets();
    let retry_options = BatchOptions {
        validate: false,
        ..options.clone()
    };

    let mut attempts = 1;
    while attempts < policy.max_attempts && !result.failed.is_empty() {
        if options.is_cancelled() {
            info!("retries abandoned after cancellation");
            break;
        }
        let delay = policy.delay_for(attempts);
        info!(
            retry = attempts,
            failed = result.failed.len(),
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "retrying failed items"
        );
        tokio::time::sleep(delay).await;

        let failed = std::mem::take(&mut result.failed);
        let retry_items: Vec<BatchItem> = failed.iter().map(|f| f.item.clone()).collect();
        let targets = retry_targets(&retry_items, &explicit, &result.auto_targets);
        let retried = run_batch(&retry_items, &retry_options, Some(targets), &mut ignore).await?;
        merge_retry(&mut result, retried, &failed);
        attempts += 1;
    }

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    result.stats = BatchStats::tally(
        items.len(),
        result.successful.len(),
        result.failed.len(),
        result.skipped.len(),
        elapsed_ms,
        attempts,
    );
    Ok(result)
}

fn retry_targets(
    items: &[BatchItem],
    explicit: &Targets,
    auto_targets: &BTreeMap<String, AutoTargetResult>,
) -> Vec<Targets> {
    items
        .iter()
        .map(|item| match auto_targets.get(item.group_key()) {
            Some(auto) => explicit.clone().or(&auto.targets()),
            None => explicit.clone(),
        })
        .collect()
}

/// Folds a retry run into the running result, mapping sub-batch positions back
/// to the original ones.
fn merge_retry(result: &mut BatchResult, retried: BatchResult, submitted: &[FailedItem]) {
    let original = |index: usize| submitted.get(index).map_or(index, |f| f.index);

    for mut item in retried.successful {
        item.index = original(item.index);
        result.successful.push(item);
    }
    for mut item in retried.failed {
        item.index = original(item.index);
        result.failed.push(item);
    }
    for mut item in retried.skipped {
        item.index = original(item.index);
        result.skipped.push(item);
    }
    result.successful.sort_by_key(|i| i.index);
    result.failed.sort_by_key(|i| i.index);
    result.skipped.sort_by_key(|i| i.index);
}
