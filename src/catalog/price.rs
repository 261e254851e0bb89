//! Rupiah price formatting
//!
//! Catalog prices arrive as numbers or as text in the Indonesian convention
//! ("12.500,00": dot for thousands, comma for decimals). Both render as
//! `Rp 12.500`. Anything unparseable renders as [`PRICE_UNKNOWN`].

use super::Cell;

/// Placeholder shown for a price cell that could not be parsed.
pub const PRICE_UNKNOWN: &str = "-";

/// Parse text as a price, Indonesian convention first, plain float second.
///
/// An ambiguous value such as `"1.234"` therefore reads as 1234.
pub fn parse_price_text(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let localized = raw.replace('.', "").replace(',', ".");
    localized
        .parse::<f64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub fn parse_price(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(v) => Some(*v).filter(|v| v.is_finite()),
        Cell::Text(s) => parse_price_text(s),
    }
}

/// Format a raw cell as `Rp N.NNN.NNN`, truncating any fraction.
pub fn format_rupiah(cell: &Cell) -> String {
    match parse_price(cell) {
        // adding 0.0 turns -0.0 into 0.0
        Some(v) => format!("Rp {}", group_thousands(&format!("{:.0}", v.trunc() + 0.0))),
        None => PRICE_UNKNOWN.to_string(),
    }
}

/// Group a decimal integer string with "." every three digits.
/// A leading `-` is kept in front of the groups.
pub fn group_thousands(integer: &str) -> String {
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", integer),
    };
    let mut grouped = String::with_capacity(integer.len() + digits.len() / 3);
    grouped.push_str(sign);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
