// econorm-core/src/infrastructure/config/mod.rs

pub mod fx_file;
pub mod loader;
pub mod settings;

pub use fx_file::load_fx_table;
pub use loader::{find_main_config, load_settings, load_settings_with_env};
pub use settings::EconormSettings;
