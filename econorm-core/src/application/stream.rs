// econorm-core/src/application/stream.rs

use futures::future;
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, error, info, warn};

use super::batch::default_outcome;
use super::options::{BatchOptions, ErrorPolicy};
use super::result::NormalizedItem;
use crate::domain::normalization::{NormalizeOptions, Targets, normalize_parsed};
use crate::domain::record::BatchItem;
use crate::error::EconormError;

/// Normalizes items as they arrive, one at a time.
///
/// Only explicit targets apply: nothing is buffered, so there is no group to
/// infer targets from. Under `skip` failed items are logged and dropped from
/// the output; under `throw` the first error is yielded and the stream ends.
/// A cancelled token yields `EconormError::Cancelled` once, then ends.
pub fn process_stream<S>(
    items: S,
    options: &BatchOptions,
) -> impl Stream<Item = Result<NormalizedItem, EconormError>> + use<S>
where
    S: Stream<Item = BatchItem>,
{
    if let Err(e) = options.check() {
        return stream::once(future::ready(Err(e))).left_stream();
    }

    let worker = StreamWorker {
        base: options.normalize_options(),
        targets: options.targets(),
        options: options.clone(),
    };

    items
        .enumerate()
        .scan(false, move |stopped, (index, item)| {
            let next = if *stopped {
                None
            } else {
                let (output, stop) = worker.step(index, item);
                *stopped = stop;
                Some(output)
            };
            future::ready(next)
        })
        .filter_map(future::ready)
        .right_stream()
}

struct StreamWorker {
    options: BatchOptions,
    base: NormalizeOptions,
    targets: Targets,
}

type Step = (Option<Result<NormalizedItem, EconormError>>, bool);

impl StreamWorker {
    /// Output for one item, and whether the stream must stop after it.
    fn step(&self, index: usize, item: BatchItem) -> Step {
        if self.options.is_cancelled() {
            info!(index, "stream cancelled");
            return (Some(Err(EconormError::Cancelled)), true);
        }

        let parsed = self.options.parser.parse(&item.unit);
        let opts = self.base.for_item(&item, self.targets.clone());
        match normalize_parsed(item.value, &item.unit, &parsed, &opts) {
            Ok(result) => (
                Some(Ok(NormalizedItem {
                    index,
                    item,
                    normalized_value: result.normalized_value,
                    normalized_unit: result.normalized_unit,
                    explain: result.explain,
                    defaulted: false,
                })),
                false,
            ),
            Err(err) => {
                let err = err.at_index(index);
                match self.options.handle_errors {
                    ErrorPolicy::Throw => {
                        error!(index, error = %err, "stream item failed");
                        (Some(Err(err.into())), true)
                    }
                    ErrorPolicy::Skip => {
                        warn!(
                            index,
                            item = %item.label(),
                            reason = err.reason(),
                            "stream item dropped"
                        );
                        (None, false)
                    }
                    ErrorPolicy::Default => {
                        debug!(index, reason = err.reason(), "stream item defaulted");
                        (Some(Ok(default_outcome(index, &item, &self.options))), false)
                    }
                }
            }
        }
    }
}
