// econorm-core/src/domain/quality/stats.rs

use serde::{Deserialize, Serialize};

/// Mean and variance accumulated in one pass (Welford's online algorithm).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    pub count: u64,
    pub mean: f64,
    /// Sum of squared deviations from the running mean.
    m2: f64,
}

impl RunningStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut stats = Self::default();
        for value in values {
            stats.push(value);
        }
        stats
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let old_mean = self.mean;
        self.mean += (value - old_mean) / self.count as f64;
        // M2_new = M2_old + (x - old_mean) * (x - new_mean)
        self.m2 += (value - old_mean) * (value - self.mean);
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// `None` until two values are seen or while the spread is ~0.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        let std_dev = self.std_dev();
        (self.count >= 2 && std_dev > 1e-9).then(|| ((value - self.mean) / std_dev).abs())
    }

    /// Spread relative to the mean; undefined for a mean of ~0.
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        (self.count >= 2 && self.mean.abs() > 1e-9).then(|| self.std_dev() / self.mean.abs())
    }
}
