// econorm-core/src/domain/normalization/label.rs

use crate::domain::units::{Scale, TimeScale};

/// Pieces of a canonical unit label, in output order:
/// `[currency] [scale] [base unit] [per <unit>] [per <time>]`.
#[derive(Debug, Default)]
pub struct UnitLabel<'a> {
    pub currency: Option<&'a str>,
    pub scale: Option<Scale>,
    pub base: Option<&'a str>,
    pub per_unit: Option<&'a str>,
    pub time_scale: Option<TimeScale>,
}

impl UnitLabel<'_> {
    /// Builds the label, or `None` when no dimension is known.
    pub fn render(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::with_capacity(5);
        if let Some(currency) = self.currency {
            parts.push(currency.to_string());
        }
        if let Some(word) = self.scale.and_then(|s| s.label()) {
            parts.push(word.to_string());
        }
        if let Some(base) = self.base {
            parts.push(base.to_string());
        }
        if let Some(per) = self.per_unit {
            parts.push(format!("per {}", per));
        }
        if let Some(ts) = self.time_scale {
            parts.push(format!("per {}", ts));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}
