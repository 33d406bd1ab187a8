// econorm-core/src/application/mod.rs

pub mod batch;
pub mod cache;
mod collector;
mod gate;
pub mod options;
pub mod result;
pub mod retry;
pub mod stream;

// --- RE-EXPORTS ---
// `use econorm_core::application::{process_batch, BatchOptions};`

pub use batch::{process_batch, process_batch_with_progress};
pub use cache::ParsedUnitCache;
pub use options::{
    BatchOptions, DEFAULT_CONCURRENCY, DEFAULT_QUALITY_THRESHOLD, ErrorPolicy, RetryPolicy,
};
pub use result::{
    BatchResult, BatchStats, CANCELLED_SKIP_REASON, FailedItem, NormalizedItem, Progress,
    QUALITY_SKIP_REASON, SkippedItem,
};
pub use retry::process_batch_with_retry;
pub use stream::process_stream;
pub use tokio_util::sync::CancellationToken;
