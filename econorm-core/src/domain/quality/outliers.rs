// econorm-core/src/domain/quality/outliers.rs

use serde::{Deserialize, Serialize};

use super::stats::RunningStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
    #[default]
    Iqr,
    /// `|z| > threshold` against the series mean.
    ZScore,
}

/// Positions (as given in `values`) lying outside the Tukey fences.
/// Needs at least four values.
pub fn iqr_outliers(values: &[(usize, f64)]) -> Vec<usize> {
    if values.len() < 4 {
        return Vec::new();
    }
    let mut sorted: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (low, high) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    values
        .iter()
        .filter(|(_, v)| *v < low || *v > high)
        .map(|(i, _)| *i)
        .collect()
}

pub fn zscore_outliers(values: &[(usize, f64)], threshold: f64) -> Vec<usize> {
    let stats = RunningStats::from_values(values.iter().map(|(_, v)| *v));
    values
        .iter()
        .filter(|(_, v)| stats.z_score(*v).is_some_and(|z| z > threshold))
        .map(|(i, _)| *i)
        .collect()
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
