// econorm-core/src/domain/quality/assessor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;
use validator::Validate;

use super::outliers::{OutlierMethod, iqr_outliers, zscore_outliers};
use super::point::DataPoint;
use super::rules::CustomRule;
use super::score::{Dimension, IssueKind, QualityIssue, QualityScore, QualityWeights, Severity};
use super::stats::RunningStats;
use crate::domain::units::{UnitCategory, UnitParser};

const STALE_WARNING_DAYS: i64 = 90;
const STALE_CRITICAL_DAYS: i64 = 365;
const GAP_FACTOR: f64 = 1.5;
const MAX_COEFFICIENT_OF_VARIATION: f64 = 2.0;
const MAX_PERCENTAGE_MAGNITUDE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Timestamp,
    Source,
    Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl ValueRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

fn default_z_threshold() -> f64 {
    3.0
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QualityConfig {
    #[serde(default)]
    pub required_fields: Vec<RequiredField>,

    #[serde(default)]
    pub expected_range: Option<ValueRange>,

    #[serde(default)]
    pub outlier_method: OutlierMethod,

    #[serde(default = "default_z_threshold")]
    #[validate(range(min = 0.5, max = 10.0))]
    pub z_threshold: f64,

    #[serde(default)]
    #[validate(nested)]
    pub weights: QualityWeights,

    #[serde(skip)]
    pub rules: Vec<CustomRule>,

    /// Reference instant for timeliness; the wall clock when unset.
    #[serde(skip)]
    pub now: Option<DateTime<Utc>>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            required_fields: Vec::new(),
            expected_range: None,
            outlier_method: OutlierMethod::default(),
            z_threshold: default_z_threshold(),
            weights: QualityWeights::default(),
            rules: Vec::new(),
            now: None,
        }
    }
}

impl QualityConfig {
    pub fn with_rule(mut self, rule: CustomRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Scores a series of data points across the six quality dimensions.
#[derive(Debug, Clone, Default)]
pub struct QualityAssessor {
    config: QualityConfig,
    parser: UnitParser,
}

impl QualityAssessor {
    pub fn new(config: QualityConfig) -> Self {
        Self {
            config,
            parser: UnitParser::default(),
        }
    }

    pub fn with_parser(mut self, parser: UnitParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    pub fn assess(&self, points: &[DataPoint]) -> QualityScore {
        if points.is_empty() {
            return QualityScore::empty();
        }

        let mut issues = Vec::new();
        self.completeness(points, &mut issues);
        self.validity(points, &mut issues);
        self.consistency(points, &mut issues);
        self.accuracy(points, &mut issues);
        self.timeliness(points, &mut issues);
        self.uniqueness(points, &mut issues);
        for (index, point) in points.iter().enumerate() {
            issues.extend(self.config.rules.iter().filter_map(|r| r.check(index, point)));
        }

        let score = QualityScore::from_issues(issues, points.len(), &self.config.weights);
        debug!(
            points = points.len(),
            overall = score.overall,
            issues = score.issues.len(),
            "quality assessed"
        );
        score
    }

    fn completeness(&self, points: &[DataPoint], issues: &mut Vec<QualityIssue>) {
        for (index, point) in points.iter().enumerate() {
            if point.value.is_none_or(f64::is_nan) {
                issues.push(
                    QualityIssue::dataset(
                        Severity::High,
                        IssueKind::MissingValue,
                        Dimension::Completeness,
                        "Value is missing",
                    )
                    .at(index, point),
                );
            }
            if point.unit_text().is_none() {
                issues.push(
                    QualityIssue::dataset(
                        Severity::Medium,
                        IssueKind::MissingUnit,
                        Dimension::Completeness,
                        "Unit is missing",
                    )
                    .at(index, point),
                );
            }
            for field in &self.config.required_fields {
                let missing = match field {
                    RequiredField::Timestamp => point.timestamp.is_none(),
                    RequiredField::Source => {
                        point.source.as_deref().is_none_or(|s| s.trim().is_empty())
                    }
                    // Already reported as a missing unit.
                    RequiredField::Unit => false,
                };
                if missing {
                    issues.push(
                        QualityIssue::dataset(
                            Severity::Low,
                            IssueKind::MissingField,
                            Dimension::Completeness,
                            format!("Required field '{:?}' is missing", field).to_lowercase(),
                        )
                        .at(index, point),
                    );
                }
            }
        }
        issues.extend(temporal_gaps(points));
    }

    fn validity(&self, points: &[DataPoint], issues: &mut Vec<QualityIssue>) {
        for (index, point) in points.iter().enumerate() {
            let Some(value) = point.value.filter(|v| !v.is_nan()) else {
                continue;
            };
            if value.is_infinite() {
                issues.push(
                    QualityIssue::dataset(
                        Severity::Critical,
                        IssueKind::NonFiniteValue,
                        Dimension::Validity,
                        format!("Value {} is not finite", value),
                    )
                    .at(index, point),
                );
                continue;
            }
            if let Some(range) = &self.config.expected_range
                && !range.contains(value)
            {
                issues.push(
                    QualityIssue::dataset(
                        Severity::High,
                        IssueKind::OutOfRange,
                        Dimension::Validity,
                        format!("Value {} is outside the expected range", value),
                    )
                    .at(index, point),
                );
            }
            if let Some(unit) = point.unit_text() {
                let parsed = self.parser.parse(unit);
                if parsed.is_unknown() {
                    issues.push(
                        QualityIssue::dataset(
                            Severity::Medium,
                            IssueKind::UnrecognizedUnit,
                            Dimension::Validity,
                            format!("Unit '{}' is not recognised", unit),
                        )
                        .at(index, point),
                    );
                } else if parsed.category == UnitCategory::Percentage
                    && value.abs() > MAX_PERCENTAGE_MAGNITUDE
                {
                    issues.push(
                        QualityIssue::dataset(
                            Severity::High,
                            IssueKind::ImplausiblePercentage,
                            Dimension::Validity,
                            format!("Percentage {} exceeds {}", value, MAX_PERCENTAGE_MAGNITUDE),
                        )
                        .at(index, point),
                    );
                }
            }
        }
    }

    fn consistency(&self, points: &[DataPoint], issues: &mut Vec<QualityIssue>) {
        let units: BTreeSet<String> = points
            .iter()
            .filter_map(DataPoint::unit_text)
            .map(str::to_lowercase)
            .collect();
        if units.len() > 1 {
            issues.push(QualityIssue::dataset(
                Severity::Medium,
                IssueKind::MixedUnits,
                Dimension::Consistency,
                format!("{} distinct units in one series", units.len()),
            ));
        }

        let values = finite_values(points);
        let stats = RunningStats::from_values(values.iter().map(|(_, v)| *v));
        if let Some(cv) = stats.coefficient_of_variation()
            && cv > MAX_COEFFICIENT_OF_VARIATION
        {
            issues.push(QualityIssue::dataset(
                Severity::Medium,
                IssueKind::HighVariation,
                Dimension::Consistency,
                format!("Coefficient of variation {:.2} exceeds {}", cv, MAX_COEFFICIENT_OF_VARIATION),
            ));
        }

        let ordered = chronological(points);
        let mut previous: Option<f64> = None;
        for index in ordered {
            let Some(value) = points[index].value.filter(|v| v.is_finite() && *v != 0.0) else {
                continue;
            };
            if let Some(prev) = previous
                && prev.signum() != value.signum()
            {
                issues.push(
                    QualityIssue::dataset(
                        Severity::Low,
                        IssueKind::SignFlip,
                        Dimension::Consistency,
                        format!("Sign changed from {} to {}", prev, value),
                    )
                    .at(index, &points[index]),
                );
            }
            previous = Some(value);
        }
    }

    fn accuracy(&self, points: &[DataPoint], issues: &mut Vec<QualityIssue>) {
        let values = finite_values(points);
        let flagged = match self.config.outlier_method {
            OutlierMethod::Iqr => iqr_outliers(&values),
            OutlierMethod::ZScore => zscore_outliers(&values, self.config.z_threshold),
        };
        for index in flagged {
            issues.push(
                QualityIssue::dataset(
                    Severity::Medium,
                    IssueKind::Outlier,
                    Dimension::Accuracy,
                    format!("Statistical outlier ({:?})", self.config.outlier_method).to_lowercase(),
                )
                .at(index, &points[index]),
            );
        }
    }

    fn timeliness(&self, points: &[DataPoint], issues: &mut Vec<QualityIssue>) {
        let Some(freshest) = points.iter().filter_map(|p| p.timestamp).max() else {
            return;
        };
        let now = self.config.now.unwrap_or_else(Utc::now);
        let age_days = (now - freshest).num_days();
        let severity = if age_days > STALE_CRITICAL_DAYS {
            Severity::Critical
        } else if age_days > STALE_WARNING_DAYS {
            Severity::Medium
        } else {
            return;
        };
        issues.push(QualityIssue::dataset(
            severity,
            IssueKind::StaleData,
            Dimension::Timeliness,
            format!("Latest observation is {} days old", age_days),
        ));
    }

    fn uniqueness(&self, points: &[DataPoint], issues: &mut Vec<QualityIssue>) {
        let mut seen = HashSet::new();
        for (index, point) in points.iter().enumerate() {
            let key = (
                point.value.map(f64::to_bits),
                point.unit_text().map(str::to_lowercase),
                point.timestamp,
            );
            if !seen.insert(key) {
                issues.push(
                    QualityIssue::dataset(
                        Severity::Low,
                        IssueKind::Duplicate,
                        Dimension::Uniqueness,
                        "Duplicate of an earlier observation",
                    )
                    .at(index, point),
                );
            }
        }
    }
}

/// Convenience wrapper with the default parser.
pub fn assess_quality(points: &[DataPoint], config: &QualityConfig) -> QualityScore {
    QualityAssessor::new(config.clone()).assess(points)
}

fn finite_values(points: &[DataPoint]) -> Vec<(usize, f64)> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.value.filter(|v| v.is_finite()).map(|v| (i, v)))
        .collect()
}

/// Indices ordered by timestamp when every point has one, else input order.
fn chronological(points: &[DataPoint]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    if points.iter().all(|p| p.timestamp.is_some()) {
        order.sort_by_key(|i| points[*i].timestamp);
    }
    order
}

/// Spacing larger than 1.5x the median spacing counts as a gap.
fn temporal_gaps(points: &[DataPoint]) -> Vec<QualityIssue> {
    let mut dated: Vec<(usize, DateTime<Utc>)> = points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.timestamp.map(|t| (i, t)))
        .collect();
    if dated.len() < 3 {
        return Vec::new();
    }
    dated.sort_by_key(|(_, t)| *t);

    let spacings: Vec<f64> = dated
        .windows(2)
        .map(|w| (w[1].1 - w[0].1).num_seconds() as f64 / 86_400.0)
        .collect();
    let mut sorted = spacings.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };
    if median <= 0.0 {
        return Vec::new();
    }

    spacings
        .iter()
        .enumerate()
        .filter(|(_, gap)| **gap > GAP_FACTOR * median)
        .map(|(k, gap)| {
            let (index, _) = dated[k + 1];
            QualityIssue::dataset(
                Severity::Medium,
                IssueKind::TemporalGap,
                Dimension::Completeness,
                format!("{:.0}-day gap (median spacing {:.0} days)", gap, median),
            )
            .at(index, &points[index])
        })
        .collect()
}
