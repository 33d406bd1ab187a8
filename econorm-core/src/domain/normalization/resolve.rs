// econorm-core/src/domain/normalization/resolve.rs
//
// Explicit upstream metadata always wins; the parsed value only fills in
// when the explicit one is absent, empty or unreadable.

use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

use crate::domain::units::{Scale, TimeScale, UNKNOWN_CURRENCY};

pub fn resolve<T>(explicit: Option<&str>, parsed: Option<T>) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = explicit.map(str::trim).filter(|s| !s.is_empty()) else {
        return parsed;
    };
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(explicit = raw, error = %e, "explicit metadata unreadable, using parsed value");
            parsed
        }
    }
}

/// Upper-cased ISO-style code, or `None` for anything that is not three letters.
pub fn explicit_currency(raw: Option<&str>) -> Option<String> {
    let code = raw?.trim();
    (code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| code.to_ascii_uppercase())
}

/// Source currency: explicit code first, then an ISO code found in the text.
/// The "UNKNOWN" placeholder never resolves.
pub fn resolve_currency(explicit: Option<&str>, parsed: Option<&str>) -> Option<String> {
    explicit_currency(explicit)
        .or_else(|| parsed.filter(|c| *c != UNKNOWN_CURRENCY).map(str::to_string))
}

/// Hundred-millions found in the text overrides any explicit scale.
pub fn resolve_scale(explicit: Option<&str>, parsed: Option<Scale>) -> Option<Scale> {
    if parsed == Some(Scale::HundredMillions) {
        return parsed;
    }
    resolve(explicit, parsed)
}

pub fn resolve_time_scale(explicit: Option<&str>, parsed: Option<TimeScale>) -> Option<TimeScale> {
    resolve(explicit, parsed)
}
