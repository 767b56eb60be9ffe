//! Phrase rendering for a signed count in a unit.
//!
//! Rendering is a capability injected into [`RelativeTime`]: anything that
//! implements [`UnitFormatter`], including a plain closure. The crate ships
//! [`EnglishFormatter`] as the default.
//!
//! [`RelativeTime`]: crate::RelativeTime

use crate::unit::Unit;

/// Turns a signed count of `unit` into a phrase. Negative values lie in the
/// past, positive values in the future.
pub trait UnitFormatter {
    fn format(&self, unit: Unit, value: i64) -> String;
}

impl<F> UnitFormatter for F
where
    F: Fn(Unit, i64) -> String,
{
    fn format(&self, unit: Unit, value: i64) -> String {
        self(unit, value)
    }
}

/// English phrases with idiomatic forms for the nearest values:
/// "now", "today", "yesterday", "next month", "this hour", otherwise
/// "in 3 days" / "2,412 hours ago".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnglishFormatter;

impl UnitFormatter for EnglishFormatter {
    fn format(&self, unit: Unit, value: i64) -> String {
        if let Some(idiom) = idiom(unit, value) {
            return idiom.to_string();
        }

        let magnitude = value.unsigned_abs();
        let count = format!(
            "{} {}{}",
            group_thousands(magnitude),
            unit.as_str(),
            if magnitude == 1 { "" } else { "s" }
        );
        if value < 0 {
            format!("{count} ago")
        } else {
            format!("in {count}")
        }
    }
}

fn idiom(unit: Unit, value: i64) -> Option<&'static str> {
    let phrase = match (unit, value) {
        (Unit::Second, 0) => "now",
        (Unit::Minute, 0) => "this minute",
        (Unit::Hour, 0) => "this hour",
        (Unit::Day, 0) => "today",
        (Unit::Day, -1) => "yesterday",
        (Unit::Day, 1) => "tomorrow",
        (Unit::Month, 0) => "this month",
        (Unit::Month, -1) => "last month",
        (Unit::Month, 1) => "next month",
        (Unit::Year, 0) => "this year",
        (Unit::Year, -1) => "last year",
        (Unit::Year, 1) => "next year",
        _ => return None,
    };
    Some(phrase)
}

/// `2412` → `"2,412"`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
