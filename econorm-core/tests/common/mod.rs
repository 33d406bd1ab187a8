// econorm-core/tests/common/mod.rs

#![allow(dead_code)]

use anyhow::Result;
use econorm_core::{BatchItem, FxTable};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Once};
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Routes library logs through the test harness so `--nocapture` shows them.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Temporary directory holding an econorm configuration.
pub struct ConfigEnv {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl ConfigEnv {
    pub fn new(config_yaml: &str) -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();
        std::fs::write(root.join("econorm.yaml"), config_yaml)?;
        Ok(Self { _tmp: tmp, root })
    }

    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// USD-based snapshot used across scenarios.
pub fn fx() -> Arc<FxTable> {
    let rates = BTreeMap::from([
        ("EUR".to_string(), 0.85),
        ("GBP".to_string(), 0.79),
        ("JPY".to_string(), 150.0),
    ]);
    Arc::new(FxTable::new("USD", rates).with_as_of("2025-01-31"))
}

pub fn named(name: &str, value: f64, unit: &str) -> BatchItem {
    BatchItem {
        name: Some(name.to_string()),
        ..BatchItem::new(value, unit)
    }
}
