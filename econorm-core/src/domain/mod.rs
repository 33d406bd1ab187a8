// econorm-core/src/domain/mod.rs

pub mod error;
pub mod fx;
pub mod normalization;
pub mod quality;
pub mod record;
pub mod semantics;
pub mod targets;
pub mod units;

// Re-exports
pub use error::DomainError;
pub use fx::FxTable;
pub use record::BatchItem;
