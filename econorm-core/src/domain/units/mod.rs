// econorm-core/src/domain/units/mod.rs

pub mod domain_units;
pub mod parsed;
pub mod parser;
pub mod scale;
pub mod time_scale;
pub mod vocabulary;

// Re-exports
pub use domain_units::{CommodityUnits, DomainUnitParser};
pub use parsed::{ParsedUnit, UNKNOWN_CURRENCY, UnitCategory};
pub use parser::{UnitParser, parse_unit};
pub use scale::Scale;
pub use time_scale::TimeScale;
