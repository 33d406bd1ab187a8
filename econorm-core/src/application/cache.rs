// econorm-core/src/application/cache.rs

use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

use crate::domain::units::{ParsedUnit, UnitParser};

/// Parse results for the distinct unit strings of one batch.
/// Built up front, then only read.
#[derive(Debug, Clone, Default)]
pub struct ParsedUnitCache {
    units: HashMap<String, ParsedUnit>,
}

impl ParsedUnitCache {
    pub fn build<'a>(units: impl IntoIterator<Item = &'a str>, parser: &UnitParser) -> Self {
        let mut cache: HashMap<String, ParsedUnit> = HashMap::new();
        for unit in units {
            if !cache.contains_key(unit) {
                cache.insert(unit.to_string(), parser.parse(unit));
            }
        }
        debug!(distinct_units = cache.len(), "unit cache built");
        Self { units: cache }
    }

    /// Cached parse, or a fresh one for a unit the cache never saw.
    pub fn parsed<'a>(&'a self, unit: &str, parser: &UnitParser) -> Cow<'a, ParsedUnit> {
        match self.units.get(unit) {
            Some(parsed) => Cow::Borrowed(parsed),
            None => Cow::Owned(parser.parse(unit)),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::UnitCategory;

    #[test]
    fn test_distinct_units_parsed_once() {
        let parser = UnitParser::new();
        let cache = ParsedUnitCache::build(["USD", "USD", "%", "USD"], &parser);
        assert_eq!(cache.len(), 2);
        assert!(matches!(cache.parsed("USD", &parser), Cow::Borrowed(_)));
        let fresh = cache.parsed("Index", &parser);
        assert!(matches!(fresh, Cow::Owned(_)));
        assert_eq!(fresh.category, UnitCategory::Index);
    }
}
