use std::ops::RangeInclusive;
use std::sync::OnceLock;

use regex::Regex;

use crate::records::{Swing, UNRANKED};

/// Plausible window for a "turned professional" year.
pub const TURNED_PRO_YEARS: RangeInclusive<i64> = 1950..=2025;

fn birth_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^(]+)").expect("static regex"))
}

/// Leading date portion of values like `"6/21/1996 (29)"`.
///
/// Without a parenthesized annotation the whole trimmed string is kept.
pub fn birth_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let date = birth_date_re()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str())
        .trim();
    (!date.is_empty()).then(|| date.to_string())
}

/// Integer year inside `range`; anything else is absent.
pub fn year_in(raw: &str, range: RangeInclusive<i64>) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|y| range.contains(y))
}

pub fn turned_pro(raw: &str) -> Option<i64> {
    year_in(raw, TURNED_PRO_YEARS)
}

pub fn swing(raw: &str) -> Option<Swing> {
    Swing::from_literal(raw.trim())
}

/// Non-negative integer literal, else the unranked sentinel.
pub fn world_rank(raw: &str) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return UNRANKED;
    }
    raw.parse().unwrap_or(UNRANKED)
}

/// Companion flag columns read `true` in any casing.
pub fn flag_is_true(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}
