// econorm-core/src/domain/units/scale.rs

use serde::{Deserialize, Serialize};
use std::fmt;

// Discriminants ascend with magnitude, so `Scale::Thousands < Scale::Billions`
// holds natively and `max()` picks the larger bucket.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Scale {
    #[default]
    Ones,
    Hundreds,
    Thousands,
    Millions,
    /// Locale accounting unit (亿 / "hundred million"), 1e8.
    HundredMillions,
    Billions,
    Trillions,
}

impl Scale {
    pub const ALL: [Scale; 7] = [
        Self::Ones,
        Self::Hundreds,
        Self::Thousands,
        Self::Millions,
        Self::HundredMillions,
        Self::Billions,
        Self::Trillions,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Ones => 1.0,
            Self::Hundreds => 1e2,
            Self::Thousands => 1e3,
            Self::Millions => 1e6,
            Self::HundredMillions => 1e8,
            Self::Billions => 1e9,
            Self::Trillions => 1e12,
        }
    }

    /// Factor that rescales a value expressed in `self` into `target`.
    pub fn factor_to(&self, target: Scale) -> f64 {
        self.multiplier() / target.multiplier()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ones => "ones",
            Self::Hundreds => "hundreds",
            Self::Thousands => "thousands",
            Self::Millions => "millions",
            Self::HundredMillions => "hundred-millions",
            Self::Billions => "billions",
            Self::Trillions => "trillions",
        }
    }

    /// Word used inside a unit label ("USD millions"). `None` for ones.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Ones => None,
            Self::HundredMillions => Some("hundred millions"),
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['_', '-'], " ");
        match key.as_str() {
            "ones" | "one" | "units" | "unit" | "1" => Ok(Self::Ones),
            "hundreds" | "hundred" | "100" => Ok(Self::Hundreds),
            "thousands" | "thousand" | "k" | "000s" | "1000" => Ok(Self::Thousands),
            "millions" | "million" | "mn" | "mln" | "mio" | "m" => Ok(Self::Millions),
            "hundred millions" | "hundred million" | "100 million" | "100 millions" | "亿" => {
                Ok(Self::HundredMillions)
            }
            "billions" | "billion" | "bn" | "bln" | "b" => Ok(Self::Billions),
            "trillions" | "trillion" | "tn" | "trn" => Ok(Self::Trillions),
            _ => Err(format!("Unknown scale: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_scale_ordering() {
        assert!(Scale::Ones < Scale::Thousands);
        assert!(Scale::Millions < Scale::HundredMillions);
        assert!(Scale::HundredMillions < Scale::Billions);
        assert_eq!(Scale::ALL.iter().max(), Some(&Scale::Trillions));
    }

    #[test]
    fn test_factor_to() {
        assert_eq!(Scale::Billions.factor_to(Scale::Millions), 1000.0);
        assert_eq!(Scale::Thousands.factor_to(Scale::Ones), 1000.0);
        assert!((Scale::Millions.factor_to(Scale::Billions) - 0.001).abs() < 1e-15);
    }

    #[test]
    fn test_display_and_parsing_consistency() -> anyhow::Result<()> {
        for scale in Scale::ALL {
            assert_eq!(
                Scale::from_str(&scale.to_string()).map_err(|e| anyhow::anyhow!(e))?,
                scale
            );
        }
        assert_eq!(
            Scale::from_str("Thousands").map_err(|e| anyhow::anyhow!(e))?,
            Scale::Thousands
        );
        assert_eq!(
            Scale::from_str("BN").map_err(|e| anyhow::anyhow!(e))?,
            Scale::Billions
        );
        assert!(Scale::from_str("dozens").is_err());
        Ok(())
    }
}
