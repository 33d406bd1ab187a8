// econorm-core/src/domain/units/parser.rs

use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::trace;

use super::domain_units::DomainUnitParser;
use super::parsed::{ParsedUnit, UNKNOWN_CURRENCY, UnitCategory};
use super::scale::Scale;
use super::time_scale::TimeScale;
use super::vocabulary::{
    COUNT_NOUNS, CURRENCY_NAMES, CURRENCY_SYMBOLS, LOCAL_CURRENCY_PLACEHOLDERS,
    MEASUREMENT_UNITS, PERCENT_WORDS, RATIO_WORDS, VocabularyEntry, is_stop_word, lookup_iso,
};

// Patterns are literals: a failed compile only disables the feature that uses them.
static TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}°]+").ok());
static PER_ANNUM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\bp\.\s?a\.?").ok());
static BASE_PERIOD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(19|20)\d{2}\s*=\s*100").ok());

/// General-purpose parser followed by optional domain dictionaries.
/// Domain parsers are only consulted when the general parse is `unknown`.
#[derive(Clone, Default)]
pub struct UnitParser {
    domains: Vec<Arc<dyn DomainUnitParser>>,
}

impl std::fmt::Debug for UnitParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.domains.iter().map(|d| d.name()).collect();
        f.debug_struct("UnitParser").field("domains", &names).finish()
    }
}

impl UnitParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, parser: Arc<dyn DomainUnitParser>) -> Self {
        self.domains.push(parser);
        self
    }

    pub fn parse(&self, unit: &str) -> ParsedUnit {
        let mut parsed = parse_unit(unit);
        if !parsed.is_unknown() {
            return parsed;
        }
        for domain in &self.domains {
            if let Some((category, label)) = domain.classify(unit) {
                trace!(unit, domain = domain.name(), "domain dictionary matched");
                parsed.category = category;
                parsed.normalized_label = Some(label);
                return parsed;
            }
        }
        parsed
    }
}

/// Parses a unit string with the general vocabulary only.
pub fn parse_unit(unit: &str) -> ParsedUnit {
    let trimmed = unit.trim();
    if trimmed.is_empty() {
        return ParsedUnit::default();
    }

    let text = preprocess(trimmed);
    let mut tokens = Tokens::new(&text);
    let mut parsed = ParsedUnit {
        time_scale: detect_time(&mut tokens),
        scale: detect_scale(&mut tokens),
        ..Default::default()
    };

    // (a) percentages, (b) indices
    if is_percentage(trimmed, &tokens) {
        parsed.category = UnitCategory::Percentage;
        let label = if is_basis_points(&tokens) { "bps" } else { "%" };
        parsed.normalized_label = Some(label.to_string());
        return parsed;
    }
    if is_index(trimmed, &tokens) {
        parsed.category = UnitCategory::Index;
        parsed.normalized_label = Some("index".to_string());
        return parsed;
    }

    let per = tokens.first_unused("per");
    let currencies = find_currencies(&mut tokens);

    // Currency pairs ("PKR/USD", "LCU per USD") are exchange rates, not amounts.
    if let Some(p) = per {
        let numerator = currencies.iter().find(|h| h.pos < p);
        let denominator = currencies.iter().find(|h| h.pos > p);
        if let (Some(a), Some(b)) = (numerator, denominator)
            && a.code != b.code
        {
            parsed.category = UnitCategory::FxRatio;
            parsed.normalized_label = Some(format!("{}/{}", pair_label(a.code), pair_label(b.code)));
            return parsed;
        }
    }

    let currency = currencies.first().map(|h| h.code.to_string());

    // (c) physical / energy / temperature vocabulary
    if let Some((pos, entry)) = find_measurement(&tokens) {
        tokens.mark(pos, entry.phrase.len());
        let in_denominator = per.is_some_and(|p| pos > p);
        if in_denominator {
            parsed.per_unit = Some(entry.label.to_string());
        } else {
            parsed.category = entry.category;
            parsed.normalized_label = Some(entry.label.to_string());
            parsed.currency = currency;
            if let Some(p) = per {
                parsed.per_unit = tokens.take_denominator(p);
            }
            return parsed;
        }
    }

    // (d) currency amounts
    if let Some(code) = currency {
        parsed.category = UnitCategory::Currency;
        parsed.currency = Some(code);
        if parsed.per_unit.is_none()
            && let Some(p) = per
        {
            parsed.per_unit = tokens.take_denominator(p);
        }
        return parsed;
    }

    // (g) counts, ratios, or bare magnitudes
    if let Some(pos) = tokens.position_of_any(COUNT_NOUNS) {
        parsed.category = UnitCategory::Count;
        parsed.normalized_label = Some(tokens.lower[pos].clone());
        tokens.mark(pos, 1);
        if parsed.per_unit.is_none()
            && let Some(p) = per
        {
            parsed.per_unit = tokens.take_denominator(p);
        }
        return parsed;
    }
    if tokens.position_of_any(RATIO_WORDS).is_some() {
        parsed.category = UnitCategory::Ratio;
        parsed.normalized_label = Some("ratio".to_string());
        return parsed;
    }
    if parsed.per_unit.is_none()
        && tokens.leftovers().next().is_none()
        && (parsed.scale.is_some() || parsed.time_scale.is_some())
    {
        parsed.category = UnitCategory::Count;
        return parsed;
    }

    trace!(unit = trimmed, "no vocabulary matched");
    parsed
}

/// Lower-case word list, shared with domain dictionaries.
pub(crate) fn words(unit: &str) -> Vec<String> {
    Tokens::new(&preprocess(unit.trim())).lower
}

// --- TOKENIZATION ---

struct Tokens {
    raw: Vec<String>,
    lower: Vec<String>,
    used: Vec<bool>,
}

impl Tokens {
    fn new(text: &str) -> Self {
        let raw: Vec<String> = match TOKEN.as_ref() {
            Some(re) => re.find_iter(text).map(|m| m.as_str().to_string()).collect(),
            None => text.split_whitespace().map(str::to_string).collect(),
        };
        let lower = raw.iter().map(|t| t.to_lowercase()).collect();
        let used = vec![false; raw.len()];
        Self { raw, lower, used }
    }

    fn len(&self) -> usize {
        self.lower.len()
    }

    fn matches_at(&self, pos: usize, phrase: &[&str]) -> bool {
        pos + phrase.len() <= self.len()
            && phrase
                .iter()
                .enumerate()
                .all(|(k, w)| !self.used[pos + k] && self.lower[pos + k] == *w)
    }

    fn contains_phrase(&self, phrase: &[&str]) -> bool {
        (0..self.len()).any(|i| self.matches_at(i, phrase))
    }

    fn mark(&mut self, pos: usize, n: usize) {
        for flag in self.used.iter_mut().skip(pos).take(n) {
            *flag = true;
        }
    }

    fn first_unused(&self, word: &str) -> Option<usize> {
        (0..self.len()).find(|&i| !self.used[i] && self.lower[i] == word)
    }

    fn position_of_any(&self, words: &[&str]) -> Option<usize> {
        (0..self.len()).find(|&i| !self.used[i] && words.contains(&self.lower[i].as_str()))
    }

    fn leftovers(&self) -> impl Iterator<Item = &str> {
        self.lower
            .iter()
            .zip(&self.used)
            .filter(|(w, used)| !**used && !is_stop_word(w) && w.as_str() != "per")
            .map(|(w, _)| w.as_str())
    }

    /// Consumes the words following `per` (up to the next `per`).
    fn take_denominator(&mut self, per: usize) -> Option<String> {
        let mut words = Vec::new();
        let mut i = per + 1;
        while i < self.len() && self.lower[i] != "per" {
            if !self.used[i] && !is_stop_word(&self.lower[i]) {
                words.push(self.lower[i].clone());
                self.used[i] = true;
            }
            i += 1;
        }
        self.mark(per, 1);
        if words.is_empty() {
            None
        } else {
            Some(words.join(" "))
        }
    }
}

fn preprocess(unit: &str) -> String {
    let mut text = unit.to_string();
    for (symbol, code) in CURRENCY_SYMBOLS {
        if text.contains(symbol) {
            text = text.replace(symbol, &format!(" {} ", code));
        }
    }
    if let Some(re) = PER_ANNUM.as_ref() {
        text = re.replace_all(&text, " per annum ").into_owned();
    }
    text.replace('/', " per ")
}

// --- DETECTORS ---

fn detect_time(tokens: &mut Tokens) -> Option<TimeScale> {
    for i in 0..tokens.len().saturating_sub(1) {
        if matches!(tokens.lower[i].as_str(), "per" | "a" | "an" | "each")
            && let Some(ts) = TimeScale::from_word(&tokens.lower[i + 1])
        {
            tokens.mark(i, 2);
            return Some(ts);
        }
    }
    for i in 0..tokens.len() {
        let periodic = match tokens.lower[i].as_str() {
            "hourly" => Some(TimeScale::Hour),
            "daily" => Some(TimeScale::Day),
            "weekly" => Some(TimeScale::Week),
            "monthly" => Some(TimeScale::Month),
            "quarterly" => Some(TimeScale::Quarter),
            "yearly" | "annual" | "annually" => Some(TimeScale::Year),
            _ => None,
        };
        if periodic.is_some() {
            tokens.mark(i, 1);
            return periodic;
        }
    }
    None
}

fn text_scale(word: &str) -> Option<Scale> {
    match word {
        "hundred" | "hundreds" => Some(Scale::Hundreds),
        "thousand" | "thousands" | "k" | "000s" => Some(Scale::Thousands),
        "million" | "millions" | "mn" | "mln" | "mio" => Some(Scale::Millions),
        "billion" | "billions" | "bn" | "bln" => Some(Scale::Billions),
        "trillion" | "trillions" | "tn" | "trn" => Some(Scale::Trillions),
        "亿" => Some(Scale::HundredMillions),
        _ => None,
    }
}

fn detect_scale(tokens: &mut Tokens) -> Option<Scale> {
    for i in 0..tokens.len().saturating_sub(1) {
        let hundred = matches!(tokens.lower[i].as_str(), "hundred" | "hundreds" | "100");
        let million = matches!(tokens.lower[i + 1].as_str(), "million" | "millions");
        if hundred && million {
            tokens.mark(i, 2);
            return Some(Scale::HundredMillions);
        }
    }
    for i in 0..tokens.len() {
        if tokens.used[i] {
            continue;
        }
        if let Some(scale) = text_scale(&tokens.lower[i]) {
            tokens.mark(i, 1);
            return Some(scale);
        }
    }
    None
}

fn is_percentage(raw: &str, tokens: &Tokens) -> bool {
    raw.contains('%')
        || PERCENT_WORDS.iter().any(|w| tokens.lower.iter().any(|t| t == w))
        || tokens.contains_phrase(&["per", "cent"])
        || tokens.contains_phrase(&["basis", "points"])
}

// Same category as percent, but a hundredth of the value.
fn is_basis_points(tokens: &Tokens) -> bool {
    tokens.lower.iter().any(|t| t == "bps") || tokens.contains_phrase(&["basis", "points"])
}

fn is_index(raw: &str, tokens: &Tokens) -> bool {
    tokens.lower.iter().any(|t| t == "index" || t == "points")
        || BASE_PERIOD.as_ref().is_some_and(|re| re.is_match(raw))
}

struct CurrencyHit {
    pos: usize,
    code: &'static str,
}

fn find_currencies(tokens: &mut Tokens) -> Vec<CurrencyHit> {
    let mut hits = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens.used[i] {
            i += 1;
            continue;
        }
        if let Some(phrase) = LOCAL_CURRENCY_PLACEHOLDERS
            .iter()
            .find(|p| tokens.matches_at(i, p))
        {
            hits.push(CurrencyHit {
                pos: i,
                code: UNKNOWN_CURRENCY,
            });
            tokens.mark(i, phrase.len());
            i += phrase.len();
            continue;
        }
        if let Some((phrase, code)) = CURRENCY_NAMES.iter().find(|(p, _)| tokens.matches_at(i, p)) {
            hits.push(CurrencyHit { pos: i, code: *code });
            tokens.mark(i, phrase.len());
            i += phrase.len();
            continue;
        }
        if let Some(code) = lookup_iso(&tokens.raw[i]) {
            hits.push(CurrencyHit { pos: i, code });
            tokens.mark(i, 1);
        }
        i += 1;
    }
    hits
}

fn find_measurement(tokens: &Tokens) -> Option<(usize, &'static VocabularyEntry)> {
    (0..tokens.len()).find_map(|i| {
        MEASUREMENT_UNITS
            .iter()
            .find(|e| tokens.matches_at(i, e.phrase))
            .map(|e| (i, e))
    })
}

fn pair_label(code: &str) -> &str {
    if code == UNKNOWN_CURRENCY { "LCU" } else { code }
}
