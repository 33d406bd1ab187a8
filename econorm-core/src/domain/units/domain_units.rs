// econorm-core/src/domain/units/domain_units.rs
//
// Domain dictionaries tried after the general parser gives up.

use super::parsed::UnitCategory;
use super::parser::words;

pub trait DomainUnitParser: Send + Sync {
    fn name(&self) -> &str;

    /// Category and canonical label when `unit` belongs to this domain.
    fn classify(&self, unit: &str) -> Option<(UnitCategory, String)>;
}

/// Commodity, agriculture and emissions units missing from the general vocabulary.
pub struct CommodityUnits;

const COMMODITY_UNITS: &[(&[&str], UnitCategory, &str)] = &[
    (&["troy", "ounces"], UnitCategory::Physical, "troy ounce"),
    (&["troy", "ounce"], UnitCategory::Physical, "troy ounce"),
    (&["troy", "oz"], UnitCategory::Physical, "troy ounce"),
    (&["oz", "t"], UnitCategory::Physical, "troy ounce"),
    (&["co2", "equivalent"], UnitCategory::Physical, "tonne CO2e"),
    (&["ozt"], UnitCategory::Physical, "troy ounce"),
    (&["ounces"], UnitCategory::Physical, "ounce"),
    (&["oz"], UnitCategory::Physical, "ounce"),
    (&["bushels"], UnitCategory::Physical, "bushel"),
    (&["bushel"], UnitCategory::Physical, "bushel"),
    (&["bu"], UnitCategory::Physical, "bushel"),
    (&["carats"], UnitCategory::Physical, "carat"),
    (&["bales"], UnitCategory::Physical, "bale"),
    (&["head"], UnitCategory::Physical, "head"),
    (&["pounds"], UnitCategory::Physical, "pound"),
    (&["lbs"], UnitCategory::Physical, "pound"),
    (&["lb"], UnitCategory::Physical, "pound"),
    (&["cwt"], UnitCategory::Physical, "hundredweight"),
    (&["tco2e"], UnitCategory::Physical, "tonne CO2e"),
    (&["co2e"], UnitCategory::Physical, "tonne CO2e"),
    (&["mmbtu"], UnitCategory::Energy, "MMBtu"),
    (&["therms"], UnitCategory::Energy, "therm"),
];

impl DomainUnitParser for CommodityUnits {
    fn name(&self) -> &str {
        "commodities"
    }

    fn classify(&self, unit: &str) -> Option<(UnitCategory, String)> {
        let tokens = words(unit);
        (0..tokens.len()).find_map(|i| {
            COMMODITY_UNITS.iter().find_map(|(phrase, category, label)| {
                let hit = i + phrase.len() <= tokens.len()
                    && phrase.iter().enumerate().all(|(k, w)| tokens[i + k] == *w);
                hit.then(|| (*category, (*label).to_string()))
            })
        })
    }
}
