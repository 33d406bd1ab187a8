// econorm-core/src/domain/targets/mod.rs

pub mod auto_target;

pub use auto_target::{
    AutoTargetConfig, AutoTargetResult, DimensionChoice, TieBreaker, group_by_indicator,
    select_targets,
};
