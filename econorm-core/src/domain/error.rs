// econorm-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Diagnostic)]
pub enum DomainError {
    #[error("Unresolvable unit: '{unit}'")]
    #[diagnostic(
        code(econorm::domain::unresolvable_unit),
        help("Supply explicit currency_code / scale metadata or register a domain unit parser.")
    )]
    UnresolvableUnit { unit: String },

    #[error("Missing exchange rate for '{currency}' (FX base: {base})")]
    #[diagnostic(
        code(econorm::domain::missing_fx_rate),
        help("Add the currency to the FX table rates or drop the target currency.")
    )]
    MissingExchangeRate { currency: String, base: String },

    #[error("Data quality score {score} is below threshold {threshold}")]
    #[diagnostic(code(econorm::domain::quality))]
    QualityBelowThreshold { score: u8, threshold: u8 },

    #[error("Item {index} could not be processed: {message}")]
    #[diagnostic(code(econorm::domain::item))]
    ItemProcessing { index: usize, message: String },

    #[error("Invalid FX table: {0}")]
    #[diagnostic(
        code(econorm::domain::fx_table),
        help("Rates must be finite, strictly positive and keyed by ISO 4217 codes.")
    )]
    InvalidFxTable(String),
}

impl DomainError {
    /// Short machine-readable reason, used in batch `failed` records.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnresolvableUnit { .. } => "unresolvable_unit",
            Self::MissingExchangeRate { .. } => "missing_exchange_rate",
            Self::QualityBelowThreshold { .. } => "quality_below_threshold",
            Self::ItemProcessing { .. } => "item_processing_error",
            Self::InvalidFxTable(_) => "invalid_fx_table",
        }
    }

    /// Attaches the batch position to errors raised without one.
    pub fn at_index(self, index: usize) -> Self {
        match self {
            Self::ItemProcessing { message, .. } => Self::ItemProcessing { index, message },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_stable() {
        let err = DomainError::UnresolvableUnit {
            unit: "widgets".into(),
        };
        assert_eq!(err.reason(), "unresolvable_unit");
        assert_eq!(err.to_string(), "Unresolvable unit: 'widgets'");

        let err = DomainError::MissingExchangeRate {
            currency: "XOF".into(),
            base: "USD".into(),
        };
        assert_eq!(err.reason(), "missing_exchange_rate");
    }

    #[test]
    fn test_at_index_only_rewrites_item_errors() {
        let err = DomainError::ItemProcessing {
            index: 0,
            message: "value is NaN".into(),
        }
        .at_index(7);
        assert!(matches!(err, DomainError::ItemProcessing { index: 7, .. }));

        let untouched = DomainError::UnresolvableUnit { unit: "x".into() }.at_index(3);
        assert!(matches!(untouched, DomainError::UnresolvableUnit { .. }));
    }
}
