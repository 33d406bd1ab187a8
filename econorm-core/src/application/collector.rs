// econorm-core/src/application/collector.rs
//
// Single owner of the batch accumulator. Workers never touch it; they send
// one `Outcome` each over the channel drained here.

use tokio::sync::mpsc;

use super::result::{FailedItem, NormalizedItem, Progress, SkippedItem};

#[derive(Debug)]
pub(crate) enum Outcome {
    Normalized(NormalizedItem),
    Failed(FailedItem),
    Skipped(SkippedItem),
}

pub(crate) type ProgressFn<'a> = &'a mut (dyn FnMut(Progress) + Send);

pub(crate) struct Collector<'a> {
    total: usize,
    successful: Vec<NormalizedItem>,
    failed: Vec<FailedItem>,
    skipped: Vec<SkippedItem>,
    on_progress: ProgressFn<'a>,
}

pub(crate) struct Partitions {
    pub successful: Vec<NormalizedItem>,
    pub failed: Vec<FailedItem>,
    pub skipped: Vec<SkippedItem>,
}

impl<'a> Collector<'a> {
    pub fn new(total: usize, on_progress: ProgressFn<'a>) -> Self {
        Self {
            total,
            successful: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            on_progress,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Normalized(item) => self.successful.push(item),
            Outcome::Failed(item) => self.failed.push(item),
            Outcome::Skipped(item) => self.skipped.push(item),
        }
        let progress = Progress {
            processed: self.successful.len() + self.failed.len() + self.skipped.len(),
            total: self.total,
            successful: self.successful.len(),
            failed: self.failed.len(),
        };
        (self.on_progress)(progress);
    }

    /// Records outcomes until every sender is dropped.
    pub async fn drain(&mut self, mut rx: mpsc::UnboundedReceiver<Outcome>) {
        while let Some(outcome) = rx.recv().await {
            self.record(outcome);
        }
    }

    /// Partitions in submission order.
    pub fn finish(mut self) -> Partitions {
        self.successful.sort_by_key(|i| i.index);
        self.failed.sort_by_key(|i| i.index);
        self.skipped.sort_by_key(|i| i.index);
        Partitions {
            successful: self.successful,
            failed: self.failed,
            skipped: self.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::BatchItem;

    #[tokio::test]
    async fn test_collector_reports_every_outcome() {
        let mut seen = Vec::new();
        let mut on_progress = |p: Progress| seen.push(p);
        let mut collector = Collector::new(3, &mut on_progress);

        let (tx, rx) = mpsc::unbounded_channel();
        for index in [2usize, 0] {
            let _ = tx.send(Outcome::Skipped(SkippedItem {
                index,
                item: BatchItem::new(1.0, "USD"),
                reason: "cancelled".into(),
            }));
        }
        let _ = tx.send(Outcome::Failed(FailedItem {
            index: 1,
            item: BatchItem::new(1.0, "widgets"),
            error: "boom".into(),
            reason: "unresolvable_unit".into(),
        }));
        drop(tx);

        collector.drain(rx).await;
        let parts = collector.finish();
        assert_eq!(parts.skipped.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(parts.failed.len(), 1);

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].processed, 3);
        assert_eq!(seen[2].failed, 1);
    }
}
