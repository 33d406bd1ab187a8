// econorm-core/src/lib.rs

// 1. Documentation is optional for now
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Domain
// Unit parsing, indicator semantics, normalization, quality scoring, auto-targets.
// Depends on nothing else in the crate.
pub mod domain;

// 2. Infrastructure
// Configuration files, FX snapshot files.
pub mod infrastructure;

// 3. Application
// Batch orchestration: quality gate, worker chunks, retry, streaming.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// `use econorm_core::{process_batch, BatchItem, BatchOptions};`
pub use application::{
    BatchOptions, BatchResult, CancellationToken, ErrorPolicy, RetryPolicy, process_batch,
    process_batch_with_progress, process_batch_with_retry, process_stream,
};
pub use domain::error::DomainError;
pub use domain::fx::FxTable;
pub use domain::normalization::{Normalizer, Targets, normalize_value};
pub use domain::quality::{QualityScore, assess_quality};
pub use domain::record::BatchItem;
pub use domain::units::{ParsedUnit, UnitParser, parse_unit};
pub use error::EconormError;
