// econorm-core/src/domain/units/time_scale.rs

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeScale {
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeScale {
    /// Canonical number of periods in a year, used for every conversion ratio.
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Self::Hour => 8760.0,
            Self::Day => 365.0,
            Self::Week => 52.0,
            Self::Month => 12.0,
            Self::Quarter => 4.0,
            Self::Year => 1.0,
        }
    }

    /// Factor turning a per-`self` value into a per-`target` value.
    /// month -> year multiplies by 12, year -> month divides by 12.
    pub fn factor_to(&self, target: TimeScale) -> f64 {
        self.periods_per_year() / target.periods_per_year()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// Recognises the free-text time words found in unit strings and
    /// reporting-frequency labels.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "hour" | "hours" | "hourly" | "hr" | "hrs" => Some(Self::Hour),
            "day" | "days" | "daily" => Some(Self::Day),
            "week" | "weeks" | "weekly" | "wk" => Some(Self::Week),
            "month" | "months" | "monthly" | "mo" | "mth" => Some(Self::Month),
            "quarter" | "quarters" | "quarterly" | "qtr" => Some(Self::Quarter),
            "year" | "years" | "yearly" | "annual" | "annually" | "annum" | "yr" | "yrs" => {
                Some(Self::Year)
            }
            _ => None,
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TimeScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        // SDMX frequency codes are single letters (A, Q, M, W, D, H).
        match key.as_str() {
            "a" | "y" => return Ok(Self::Year),
            "q" => return Ok(Self::Quarter),
            "m" => return Ok(Self::Month),
            "w" => return Ok(Self::Week),
            "d" => return Ok(Self::Day),
            "h" => return Ok(Self::Hour),
            _ => {}
        }
        Self::from_word(&key).ok_or_else(|| format!("Unknown time scale: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_periods_per_year() {
        assert_eq!(TimeScale::Month.factor_to(TimeScale::Year), 12.0);
        assert_eq!(TimeScale::Quarter.factor_to(TimeScale::Year), 4.0);
        assert!((TimeScale::Year.factor_to(TimeScale::Month) - 1.0 / 12.0).abs() < 1e-15);
        assert_eq!(TimeScale::Hour.factor_to(TimeScale::Day), 8760.0 / 365.0);
    }

    #[test]
    fn test_frequency_labels() -> anyhow::Result<()> {
        let parse = |s: &str| TimeScale::from_str(s).map_err(|e| anyhow::anyhow!(e));
        assert_eq!(parse("Quarterly")?, TimeScale::Quarter);
        assert_eq!(parse("Annual")?, TimeScale::Year);
        assert_eq!(parse("M")?, TimeScale::Month);
        assert_eq!(parse(" monthly ")?, TimeScale::Month);
        assert!(parse("fortnightly").is_err());
        Ok(())
    }
}
