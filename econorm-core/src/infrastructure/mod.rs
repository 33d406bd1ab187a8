// econorm-core/src/infrastructure/mod.rs

pub mod config;
pub mod error;

pub use config::{EconormSettings, load_fx_table, load_settings, load_settings_with_env};
pub use error::InfrastructureError;
