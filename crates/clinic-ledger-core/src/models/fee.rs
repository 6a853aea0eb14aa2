//! Fee model: line-item normalization and fee computation.
//!
//! All clamping and defaulting of untrusted fee input lives here. Malformed
//! input is absorbed (clamped, defaulted, or dropped), never surfaced as an
//! error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::VisitRecord;

/// Separator between item names in the display summary.
const ITEM_SEPARATOR: &str = "、";

/// A single billable component of a visit's fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item name (may be empty)
    pub name: String,
    /// Unit price, never negative
    pub unit_price: f64,
    /// Quantity, at least 1
    pub quantity: u32,
    /// `round2(unit_price * quantity)`
    pub subtotal: f64,
}

impl LineItem {
    /// Create a line item, clamping the price non-negative and the quantity
    /// to at least 1.
    pub fn new(name: String, unit_price: f64, quantity: u32) -> Self {
        let unit_price = if unit_price.is_finite() {
            unit_price.max(0.0)
        } else {
            0.0
        };
        let quantity = quantity.max(1);
        let subtotal = round2(unit_price * quantity as f64);
        Self {
            name,
            unit_price,
            quantity,
            subtotal,
        }
    }

    /// An item is kept only when it names something or charges something.
    pub fn is_meaningful(&self) -> bool {
        !self.name.is_empty() || self.subtotal != 0.0
    }
}

/// Round to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse an untrusted nested value (typically a JSON-encoded form field)
/// into normalized line items.
///
/// Tolerates any shape: non-array input yields no items, non-object entries
/// are skipped, malformed prices clamp to 0, malformed quantities default
/// to 1. Items that end up nameless with a zero subtotal are dropped.
/// Never fails.
pub fn parse_line_items(raw: &Value) -> Vec<LineItem> {
    let entries = match raw.as_array() {
        Some(entries) => entries,
        None => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| {
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string();
            let unit_price = number_field(entry.get("price"));
            let quantity = quantity_field(entry.get("quantity"));
            LineItem::new(name, unit_price, quantity)
        })
        .filter(LineItem::is_meaningful)
        .collect()
}

/// Effective fee for a record: itemized total when line items exist,
/// otherwise the flat fee clamped non-negative. Itemized mode takes
/// precedence over whatever `fee` holds.
pub fn effective_fee(record: &VisitRecord) -> f64 {
    if record.fee_items.is_empty() {
        round2(record.fee.max(0.0))
    } else {
        round2(record.fee_items.iter().map(|item| item.subtotal).sum())
    }
}

/// Display summary of line-item names, used as the fallback when a
/// submission has no free-text item field.
pub fn summarize_items(record: &VisitRecord) -> String {
    record
        .fee_items
        .iter()
        .map(|item| item.name.as_str())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(ITEM_SEPARATOR)
}

/// Coerce a raw flat-fee string: clamp non-negative, round to two decimals,
/// and fall back to 0 when unparseable.
pub fn parse_flat_fee(raw: &str) -> f64 {
    let fee = raw.trim().parse::<f64>().unwrap_or(0.0);
    if !fee.is_finite() {
        return 0.0;
    }
    round2(fee.max(0.0))
}

/// Numeric field accepting both JSON numbers and numeric strings.
///
/// Strings like `"inf"` or `"1e999"` parse to non-finite floats that JSON
/// cannot represent; they are malformed input and clamp to 0 like any other
/// garbage.
fn number_field(value: Option<&Value>) -> f64 {
    let value = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn quantity_field(value: Option<&Value>) -> u32 {
    let quantity = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(1.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(1.0),
        _ => 1.0,
    };
    // Anything that is not a whole count of at least 1 is malformed.
    if quantity.is_finite() && quantity >= 1.0 && quantity.fract() == 0.0 {
        quantity as u32
    } else {
        1
    }
}
