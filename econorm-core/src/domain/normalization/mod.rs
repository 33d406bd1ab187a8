// econorm-core/src/domain/normalization/mod.rs

pub mod explain;
pub mod label;
pub mod normalizer;
pub mod resolve;

pub use explain::{Explain, FxExplain, MagnitudeExplain, PeriodicityExplain, UnitsExplain};
pub use normalizer::{
    NormalizationResult, NormalizeOptions, Normalizer, Targets, normalize_parsed, normalize_value,
};
pub use resolve::{resolve, resolve_currency, resolve_scale, resolve_time_scale};
