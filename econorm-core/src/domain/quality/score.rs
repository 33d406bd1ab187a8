// econorm-core/src/domain/quality/score.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use validator::Validate;

use super::point::DataPoint;

// Ascending discriminants: `Severity::Low < Severity::Critical` and `max()` picks the worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Share of one point's worth of score lost to a point-level issue.
    fn point_weight(&self) -> f64 {
        match self {
            Self::Low => 0.25,
            Self::Medium => 0.5,
            Self::High => 0.75,
            Self::Critical => 1.0,
        }
    }

    /// Points deducted from a dimension for a dataset-level issue.
    fn dataset_penalty(&self) -> f64 {
        match self {
            Self::Low => 10.0,
            Self::Medium => 25.0,
            Self::High => 50.0,
            Self::Critical => 100.0,
        }
    }

    pub fn is_blocking(&self) -> bool {
        *self >= Self::High
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "warning" => Ok(Self::Medium),
            "high" | "error" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Completeness,
    Validity,
    Consistency,
    Accuracy,
    Timeliness,
    Uniqueness,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Self::Completeness,
        Self::Validity,
        Self::Consistency,
        Self::Accuracy,
        Self::Timeliness,
        Self::Uniqueness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completeness => "completeness",
            Self::Validity => "validity",
            Self::Consistency => "consistency",
            Self::Accuracy => "accuracy",
            Self::Timeliness => "timeliness",
            Self::Uniqueness => "uniqueness",
        }
    }

    fn recommendation(&self) -> &'static str {
        match self {
            Self::Completeness => "Fill missing values and close reporting gaps before normalizing.",
            Self::Validity => "Review invalid values and units that could not be recognised.",
            Self::Consistency => "Harmonise units and check the series for structural breaks.",
            Self::Accuracy => "Investigate statistical outliers against the original source.",
            Self::Timeliness => "Refresh the data; the latest observation is stale.",
            Self::Uniqueness => "Remove duplicate observations.",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NoData,
    MissingValue,
    MissingUnit,
    MissingField,
    TemporalGap,
    NonFiniteValue,
    OutOfRange,
    UnrecognizedUnit,
    ImplausiblePercentage,
    MixedUnits,
    HighVariation,
    SignFlip,
    Outlier,
    StaleData,
    Duplicate,
    CustomRule,
}

impl IssueKind {
    fn recommendation(&self) -> Option<&'static str> {
        match self {
            Self::NoData => Some("Provide at least one data point."),
            Self::UnrecognizedUnit => {
                Some("Register a domain unit dictionary or supply explicit unit metadata.")
            }
            Self::MixedUnits => Some("Normalize every item to a common target before comparing."),
            Self::ImplausiblePercentage => {
                Some("Check whether percentages are expressed as basis points or raw ratios.")
            }
            Self::TemporalGap => Some("Backfill the missing periods or mark them explicitly."),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub dimension: Dimension,
    pub message: String,
    /// Position of the offending record; `None` for dataset-level findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<DataPoint>,
}

impl QualityIssue {
    pub fn dataset(
        severity: Severity,
        kind: IssueKind,
        dimension: Dimension,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            dimension,
            message: message.into(),
            index: None,
            point: None,
        }
    }

    pub fn at(mut self, index: usize, point: &DataPoint) -> Self {
        self.index = Some(index);
        self.point = Some(point.clone());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct QualityWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub completeness: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub validity: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub consistency: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub accuracy: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub timeliness: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub uniqueness: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            completeness: 0.25,
            validity: 0.25,
            consistency: 0.15,
            accuracy: 0.15,
            timeliness: 0.10,
            uniqueness: 0.10,
        }
    }
}

impl QualityWeights {
    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Completeness => self.completeness,
            Dimension::Validity => self.validity,
            Dimension::Consistency => self.consistency,
            Dimension::Accuracy => self.accuracy,
            Dimension::Timeliness => self.timeliness,
            Dimension::Uniqueness => self.uniqueness,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DimensionScores {
    pub completeness: u8,
    pub validity: u8,
    pub consistency: u8,
    pub accuracy: u8,
    pub timeliness: u8,
    pub uniqueness: u8,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Completeness => self.completeness,
            Dimension::Validity => self.validity,
            Dimension::Consistency => self.consistency,
            Dimension::Accuracy => self.accuracy,
            Dimension::Timeliness => self.timeliness,
            Dimension::Uniqueness => self.uniqueness,
        }
    }

    fn set(&mut self, dimension: Dimension, score: u8) {
        let slot = match dimension {
            Dimension::Completeness => &mut self.completeness,
            Dimension::Validity => &mut self.validity,
            Dimension::Consistency => &mut self.consistency,
            Dimension::Accuracy => &mut self.accuracy,
            Dimension::Timeliness => &mut self.timeliness,
            Dimension::Uniqueness => &mut self.uniqueness,
        };
        *slot = score;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub overall: u8,
    pub dimensions: DimensionScores,
    pub issues: Vec<QualityIssue>,
    pub recommendations: Vec<String>,
}

impl QualityScore {
    pub fn empty() -> Self {
        let issues = vec![QualityIssue::dataset(
            Severity::Critical,
            IssueKind::NoData,
            Dimension::Completeness,
            "No data points to assess",
        )];
        let recommendations = recommendations(&DimensionScores::default(), &issues);
        Self {
            overall: 0,
            dimensions: DimensionScores::default(),
            issues,
            recommendations,
        }
    }

    /// Scores each dimension from its issues and folds them into the weighted overall.
    pub fn from_issues(issues: Vec<QualityIssue>, total: usize, weights: &QualityWeights) -> Self {
        let mut dimensions = DimensionScores::default();
        for dimension in Dimension::ALL {
            dimensions.set(dimension, dimension_score(&issues, dimension, total));
        }

        let weight_sum: f64 = Dimension::ALL.iter().map(|d| weights.weight(*d)).sum();
        let overall = if weight_sum > 0.0 {
            Dimension::ALL
                .iter()
                .map(|d| weights.weight(*d) * f64::from(dimensions.get(*d)))
                .sum::<f64>()
                / weight_sum
        } else {
            Dimension::ALL
                .iter()
                .map(|d| f64::from(dimensions.get(*d)))
                .sum::<f64>()
                / Dimension::ALL.len() as f64
        };

        let recommendations = recommendations(&dimensions, &issues);
        Self {
            overall: overall.round().clamp(0.0, 100.0) as u8,
            dimensions,
            issues,
            recommendations,
        }
    }

    /// Records singled out by high or critical issues.
    pub fn flagged_indices(&self) -> BTreeSet<usize> {
        self.issues
            .iter()
            .filter(|i| i.severity.is_blocking())
            .filter_map(|i| i.index)
            .collect()
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }
}

fn dimension_score(issues: &[QualityIssue], dimension: Dimension, total: usize) -> u8 {
    let mut worst_per_point: BTreeMap<usize, Severity> = BTreeMap::new();
    let mut penalty = 0.0;
    for issue in issues.iter().filter(|i| i.dimension == dimension) {
        match issue.index {
            Some(index) => {
                let worst = worst_per_point.entry(index).or_insert(issue.severity);
                *worst = (*worst).max(issue.severity);
            }
            None => penalty += issue.severity.dataset_penalty(),
        }
    }
    let affected: f64 = worst_per_point.values().map(Severity::point_weight).sum();
    let share = if total == 0 { 1.0 } else { affected / total as f64 };
    (100.0 * (1.0 - share) - penalty).clamp(0.0, 100.0).round() as u8
}

const RECOMMENDATION_THRESHOLD: u8 = 80;

fn recommendations(dimensions: &DimensionScores, issues: &[QualityIssue]) -> Vec<String> {
    let mut out: Vec<String> = Dimension::ALL
        .iter()
        .filter(|d| dimensions.get(**d) < RECOMMENDATION_THRESHOLD)
        .map(|d| d.recommendation().to_string())
        .collect();
    for text in issues.iter().filter_map(|i| i.kind.recommendation()) {
        if !out.iter().any(|r| r == text) {
            out.push(text.to_string());
        }
    }
    out
}
