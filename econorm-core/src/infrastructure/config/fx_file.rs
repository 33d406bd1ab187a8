// econorm-core/src/infrastructure/config/fx_file.rs

use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

use crate::domain::fx::FxTable;
use crate::infrastructure::error::InfrastructureError;

/// Reads an FX snapshot. `.json` files are parsed as JSON, everything else as YAML.
#[instrument]
pub fn load_fx_table(path: &Path) -> Result<FxTable, InfrastructureError> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read FX table at {:?}", path))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let table: FxTable = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    table
        .check()
        .map_err(|e| InfrastructureError::ConfigError(format!("{} ({:?})", e, path)))?;
    info!(base = %table.base, rates = table.rates.len(), as_of = ?table.as_of, "FX table loaded");
    Ok(table)
}
