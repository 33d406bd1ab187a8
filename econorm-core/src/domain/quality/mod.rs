// econorm-core/src/domain/quality/mod.rs

pub mod assessor;
pub mod outliers;
pub mod point;
pub mod rules;
pub mod score;
pub mod stats;

pub use assessor::{QualityAssessor, QualityConfig, RequiredField, ValueRange, assess_quality};
pub use outliers::OutlierMethod;
pub use point::DataPoint;
pub use rules::CustomRule;
pub use score::{
    Dimension, DimensionScores, IssueKind, QualityIssue, QualityScore, QualityWeights, Severity,
};
pub use stats::RunningStats;
