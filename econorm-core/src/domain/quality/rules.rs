// econorm-core/src/domain/quality/rules.rs

use std::fmt;
use std::sync::Arc;

use super::point::DataPoint;
use super::score::{Dimension, IssueKind, QualityIssue, Severity};

type Predicate = Arc<dyn Fn(&DataPoint) -> bool + Send + Sync>;

/// Caller-supplied per-point check. `passes` returning false raises an issue.
#[derive(Clone)]
pub struct CustomRule {
    pub name: String,
    pub severity: Severity,
    pub dimension: Dimension,
    pub message: String,
    passes: Predicate,
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl CustomRule {
    pub fn new<F>(
        name: impl Into<String>,
        severity: Severity,
        dimension: Dimension,
        message: impl Into<String>,
        passes: F,
    ) -> Self
    where
        F: Fn(&DataPoint) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            severity,
            dimension,
            message: message.into(),
            passes: Arc::new(passes),
        }
    }

    pub fn check(&self, index: usize, point: &DataPoint) -> Option<QualityIssue> {
        if (self.passes)(point) {
            return None;
        }
        Some(
            QualityIssue::dataset(
                self.severity,
                IssueKind::CustomRule,
                self.dimension,
                format!("{}: {}", self.name, self.message),
            )
            .at(index, point),
        )
    }
}
