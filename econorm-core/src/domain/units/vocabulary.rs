// econorm-core/src/domain/units/vocabulary.rs
//
// Static dictionaries consulted by the unit parser. Everything here is
// lower-case except ISO codes, which are stored upper-case.

use super::parsed::UnitCategory;

pub const ISO_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "CNY", "CHF", "CAD", "AUD", "NZD", "SEK", "NOK", "DKK", "ISK",
    "PLN", "CZK", "HUF", "RON", "BGN", "HRK", "RSD", "TRY", "RUB", "UAH", "BYN", "KZT", "GEL",
    "AMD", "AZN", "INR", "PKR", "BDT", "LKR", "NPR", "IDR", "MYR", "SGD", "THB", "VND", "PHP",
    "KRW", "TWD", "HKD", "MOP", "MNT", "KHR", "LAK", "MMK", "BRL", "ARS", "CLP", "COP", "PEN",
    "UYU", "PYG", "BOB", "VES", "MXN", "CRC", "GTQ", "HNL", "NIO", "DOP", "JMD", "TTD", "CUP",
    "ZAR", "NGN", "KES", "GHS", "EGP", "MAD", "TND", "DZD", "ETB", "TZS", "UGX", "XOF", "XAF",
    "ZMW", "BWP", "MUR", "SAR", "AED", "QAR", "KWD", "BHD", "OMR", "JOD", "ILS", "IRR", "IQD",
    "LBP", "YER", "AFN", "ALL", "MKD", "BAM", "MDL", "TOP", "FJD", "PGK", "SOS", "XDR",
];

/// ISO codes that are also ordinary English words; only matched upper-case.
pub const AMBIGUOUS_CODES: &[&str] = &[
    "ALL", "TOP", "CUP", "MOP", "TRY", "GEL", "BOB", "MAD", "PEN", "AMD", "BAM", "CAD", "SOS",
    "LAK",
];

/// Symbols replaced by their ISO code before tokenization. Longest first.
pub const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("US$", "USD"),
    ("C$", "CAD"),
    ("A$", "AUD"),
    ("HK$", "HKD"),
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
    ("₩", "KRW"),
];

/// Multi-word currency names, matched on lower-case tokens. Longest first.
pub const CURRENCY_NAMES: &[(&[&str], &str)] = &[
    (&["hong", "kong", "dollars"], "HKD"),
    (&["hong", "kong", "dollar"], "HKD"),
    (&["new", "zealand", "dollars"], "NZD"),
    (&["new", "zealand", "dollar"], "NZD"),
    (&["canadian", "dollars"], "CAD"),
    (&["canadian", "dollar"], "CAD"),
    (&["australian", "dollars"], "AUD"),
    (&["australian", "dollar"], "AUD"),
    (&["singapore", "dollars"], "SGD"),
    (&["singapore", "dollar"], "SGD"),
    (&["pounds", "sterling"], "GBP"),
    (&["pound", "sterling"], "GBP"),
    (&["swiss", "francs"], "CHF"),
    (&["swiss", "franc"], "CHF"),
    (&["indian", "rupees"], "INR"),
    (&["korean", "won"], "KRW"),
    (&["brazilian", "reais"], "BRL"),
    (&["dollars"], "USD"),
    (&["dollar"], "USD"),
    (&["euros"], "EUR"),
    (&["euro"], "EUR"),
    (&["sterling"], "GBP"),
    (&["yen"], "JPY"),
    (&["yuan"], "CNY"),
    (&["renminbi"], "CNY"),
    (&["rmb"], "CNY"),
    (&["rubles"], "RUB"),
    (&["roubles"], "RUB"),
    (&["reais"], "BRL"),
];

/// Local-currency placeholders that carry no ISO code.
pub const LOCAL_CURRENCY_PLACEHOLDERS: &[&[&str]] = &[
    &["national", "currency"],
    &["local", "currency"],
    &["domestic", "currency"],
    &["lcu"],
];

pub struct VocabularyEntry {
    pub phrase: &'static [&'static str],
    pub category: UnitCategory,
    pub label: &'static str,
}

const fn entry(
    phrase: &'static [&'static str],
    category: UnitCategory,
    label: &'static str,
) -> VocabularyEntry {
    VocabularyEntry {
        phrase,
        category,
        label,
    }
}

/// Physical / energy / temperature vocabulary. Longer phrases come first so
/// "tonnes of oil equivalent" wins over "tonnes".
pub const MEASUREMENT_UNITS: &[VocabularyEntry] = &[
    entry(&["tonnes", "of", "oil", "equivalent"], UnitCategory::Energy, "tonne of oil equivalent"),
    entry(&["tons", "of", "oil", "equivalent"], UnitCategory::Energy, "tonne of oil equivalent"),
    entry(&["barrels", "of", "oil", "equivalent"], UnitCategory::Energy, "barrel of oil equivalent"),
    entry(&["kilowatt", "hours"], UnitCategory::Energy, "kWh"),
    entry(&["megawatt", "hours"], UnitCategory::Energy, "MWh"),
    entry(&["gigawatt", "hours"], UnitCategory::Energy, "GWh"),
    entry(&["terawatt", "hours"], UnitCategory::Energy, "TWh"),
    entry(&["degrees", "celsius"], UnitCategory::Temperature, "°C"),
    entry(&["degrees", "fahrenheit"], UnitCategory::Temperature, "°F"),
    entry(&["metric", "tonnes"], UnitCategory::Physical, "tonne"),
    entry(&["metric", "tons"], UnitCategory::Physical, "tonne"),
    entry(&["cubic", "meters"], UnitCategory::Physical, "cubic meter"),
    entry(&["cubic", "metres"], UnitCategory::Physical, "cubic meter"),
    entry(&["square", "meters"], UnitCategory::Physical, "square meter"),
    entry(&["square", "metres"], UnitCategory::Physical, "square meter"),
    entry(&["square", "kilometers"], UnitCategory::Physical, "square kilometer"),
    entry(&["square", "kilometres"], UnitCategory::Physical, "square kilometer"),
    entry(&["sq", "km"], UnitCategory::Physical, "square kilometer"),
    entry(&["toe"], UnitCategory::Energy, "tonne of oil equivalent"),
    entry(&["boe"], UnitCategory::Energy, "barrel of oil equivalent"),
    entry(&["kwh"], UnitCategory::Energy, "kWh"),
    entry(&["mwh"], UnitCategory::Energy, "MWh"),
    entry(&["gwh"], UnitCategory::Energy, "GWh"),
    entry(&["twh"], UnitCategory::Energy, "TWh"),
    entry(&["joules"], UnitCategory::Energy, "joule"),
    entry(&["terajoules"], UnitCategory::Energy, "terajoule"),
    entry(&["tj"], UnitCategory::Energy, "terajoule"),
    entry(&["petajoules"], UnitCategory::Energy, "petajoule"),
    entry(&["pj"], UnitCategory::Energy, "petajoule"),
    entry(&["btu"], UnitCategory::Energy, "BTU"),
    entry(&["megawatts"], UnitCategory::Energy, "MW"),
    entry(&["mw"], UnitCategory::Energy, "MW"),
    entry(&["gigawatts"], UnitCategory::Energy, "GW"),
    entry(&["gw"], UnitCategory::Energy, "GW"),
    entry(&["celsius"], UnitCategory::Temperature, "°C"),
    entry(&["°c"], UnitCategory::Temperature, "°C"),
    entry(&["fahrenheit"], UnitCategory::Temperature, "°F"),
    entry(&["°f"], UnitCategory::Temperature, "°F"),
    entry(&["kelvin"], UnitCategory::Temperature, "K"),
    entry(&["tonnes"], UnitCategory::Physical, "tonne"),
    entry(&["tonne"], UnitCategory::Physical, "tonne"),
    entry(&["tons"], UnitCategory::Physical, "tonne"),
    entry(&["ton"], UnitCategory::Physical, "tonne"),
    entry(&["kilotonnes"], UnitCategory::Physical, "kilotonne"),
    entry(&["kt"], UnitCategory::Physical, "kilotonne"),
    entry(&["kilograms"], UnitCategory::Physical, "kilogram"),
    entry(&["kilogram"], UnitCategory::Physical, "kilogram"),
    entry(&["kg"], UnitCategory::Physical, "kilogram"),
    entry(&["grams"], UnitCategory::Physical, "gram"),
    entry(&["barrels"], UnitCategory::Physical, "barrel"),
    entry(&["barrel"], UnitCategory::Physical, "barrel"),
    entry(&["bbl"], UnitCategory::Physical, "barrel"),
    entry(&["liters"], UnitCategory::Physical, "liter"),
    entry(&["litres"], UnitCategory::Physical, "liter"),
    entry(&["liter"], UnitCategory::Physical, "liter"),
    entry(&["litre"], UnitCategory::Physical, "liter"),
    entry(&["gallons"], UnitCategory::Physical, "gallon"),
    entry(&["m3"], UnitCategory::Physical, "cubic meter"),
    entry(&["m2"], UnitCategory::Physical, "square meter"),
    entry(&["km2"], UnitCategory::Physical, "square kilometer"),
    entry(&["hectares"], UnitCategory::Physical, "hectare"),
    entry(&["ha"], UnitCategory::Physical, "hectare"),
    entry(&["kilometers"], UnitCategory::Physical, "kilometer"),
    entry(&["kilometres"], UnitCategory::Physical, "kilometer"),
    entry(&["km"], UnitCategory::Physical, "kilometer"),
    entry(&["miles"], UnitCategory::Physical, "mile"),
];

pub const COUNT_NOUNS: &[&str] = &[
    "persons", "person", "people", "units", "jobs", "households", "vehicles", "cars", "workers",
    "employees", "tourists", "visitors", "arrivals", "passengers", "dwellings", "houses",
    "homes", "permits", "companies", "firms", "enterprises", "births", "deaths", "cases",
    "doses", "transactions", "applications", "claims", "students", "patients", "subscribers",
    "contracts", "number", "count", "items", "pieces", "inhabitants",
];

pub const RATIO_WORDS: &[&str] = &["ratio", "times", "multiple"];

pub const PERCENT_WORDS: &[&str] = &["percent", "percentage", "pct", "bps", "pp"];

/// Filler words that never change the meaning of a unit.
pub const STOP_WORDS: &[&str] = &[
    "of", "in", "the", "at", "and", "a", "an", "to", "for", "by", "us", "current", "constant",
    "prices", "nominal", "real", "terms", "sa", "nsa", "seasonally", "adjusted", "not",
    "chained", "value", "amount", "level", "total",
];

/// Resolves a token to an ISO code. Ambiguous codes only match upper-case.
pub fn lookup_iso(raw: &str) -> Option<&'static str> {
    if raw.len() != 3 || !raw.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let upper = raw.to_ascii_uppercase();
    let code = ISO_CURRENCIES.iter().find(|c| **c == upper)?;
    if AMBIGUOUS_CODES.contains(code) && raw != *code {
        return None;
    }
    Some(code)
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word) || word.chars().all(|c| c.is_ascii_digit())
}
