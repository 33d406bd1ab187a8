// econorm-core/src/domain/fx.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

use crate::domain::error::DomainError;

/// Immutable snapshot of exchange rates relative to `base`.
/// `rates[c]` is the number of units of `c` worth one unit of `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FxTable {
    #[validate(length(equal = 3, message = "FX base must be a 3-letter ISO code"))]
    pub base: String,

    #[validate(custom(function = "validate_rates"))]
    pub rates: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
}

/// A single applied conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxConversion {
    pub value: f64,
    /// Cross rate applied: `value_out = value_in * rate`.
    pub rate: f64,
}

impl FxTable {
    pub fn new(base: impl Into<String>, rates: BTreeMap<String, f64>) -> Self {
        Self {
            base: base.into().to_ascii_uppercase(),
            rates,
            dates: None,
            as_of: None,
        }
    }

    pub fn with_as_of(mut self, as_of: impl Into<String>) -> Self {
        self.as_of = Some(as_of.into());
        self
    }

    /// Rate of `code` against the base; the base itself is always 1.
    pub fn rate(&self, code: &str) -> Option<f64> {
        let code = code.trim();
        if code.eq_ignore_ascii_case(&self.base) {
            return Some(1.0);
        }
        self.rates.get(code).copied().or_else(|| {
            self.rates
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(code))
                .map(|(_, v)| *v)
        })
    }

    /// Date attached to an individual rate, if the table carries one.
    pub fn rate_date(&self, code: &str) -> Option<&str> {
        self.dates.as_ref()?.get(code).map(String::as_str)
    }

    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::InvalidFxTable(e.to_string()))
    }

    /// Converts through the base: `value / rate[from] * rate[to]`.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<FxConversion, DomainError> {
        let missing = |currency: &str| DomainError::MissingExchangeRate {
            currency: currency.to_string(),
            base: self.base.clone(),
        };
        let from_rate = self.rate(from).ok_or_else(|| missing(from))?;
        let to_rate = self.rate(to).ok_or_else(|| missing(to))?;
        let value_in_base = value / from_rate;
        Ok(FxConversion {
            value: value_in_base * to_rate,
            rate: to_rate / from_rate,
        })
    }
}

fn validate_rates(rates: &BTreeMap<String, f64>) -> Result<(), ValidationError> {
    for (code, rate) in rates {
        if !rate.is_finite() || *rate <= 0.0 {
            let mut err = ValidationError::new("invalid_rate");
            err.message = Some(format!("rate for {} must be finite and > 0 (got {})", code, rate).into());
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn table() -> FxTable {
        let mut rates = BTreeMap::new();
        rates.insert("EUR".to_string(), 0.85);
        rates.insert("JPY".to_string(), 150.0);
        FxTable::new("USD", rates)
    }

    #[test]
    fn test_base_relative_conversion() -> Result<()> {
        let fx = table();
        let eur_to_usd = fx.convert(300.0, "EUR", "USD")?;
        assert!((eur_to_usd.value - 352.941_176_470_588).abs() < 1e-9);

        let eur_to_jpy = fx.convert(1.0, "EUR", "JPY")?;
        assert!((eur_to_jpy.value - 150.0 / 0.85).abs() < 1e-9);
        assert!((eur_to_jpy.rate - 150.0 / 0.85).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_round_trip_is_lossless() -> Result<()> {
        let fx = table();
        for value in [1.0, 123.456, 9.99e9, -42.0] {
            let there = fx.convert(value, "JPY", "EUR")?;
            let back = fx.convert(there.value, "EUR", "JPY")?;
            assert!(((back.value - value) / value).abs() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_missing_rate() {
        let err = table().convert(1.0, "XOF", "USD");
        assert!(matches!(
            err,
            Err(DomainError::MissingExchangeRate { currency, .. }) if currency == "XOF"
        ));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let fx = table();
        assert_eq!(fx.rate("usd"), Some(1.0));
        assert_eq!(fx.rate("eur"), Some(0.85));
    }

    #[test]
    fn test_validation_rejects_bad_rates() {
        let mut fx = table();
        assert!(fx.check().is_ok());
        fx.rates.insert("GBP".to_string(), 0.0);
        assert!(matches!(fx.check(), Err(DomainError::InvalidFxTable(_))));

        let bad_base = FxTable::new("DOLLAR", BTreeMap::new());
        assert!(bad_base.check().is_err());
    }

    #[test]
    fn test_json_shape() -> Result<()> {
        let fx: FxTable = serde_json::from_str(
            r#"{"base": "USD", "rates": {"EUR": 0.92}, "asOf": "2025-01-31T00:00:00Z"}"#,
        )?;
        assert_eq!(fx.as_of.as_deref(), Some("2025-01-31T00:00:00Z"));
        assert_eq!(fx.rate("EUR"), Some(0.92));
        Ok(())
    }
}
