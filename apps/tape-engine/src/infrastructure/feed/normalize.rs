//! Wire Message Normalization
//!
//! Tolerant decoding of one raw inbound message into a canonical
//! [`TradeEvent`]. Upstream feeds use two naming conventions, mixed use
//! tolerated per field:
//!
//! - verbose: `ts` / `price` / `qty` / `side`
//! - compact: `T` / `p` / `q` / `m` (maker flag)
//!
//! Numbers may arrive as JSON numbers or as numeric strings; the replay
//! path stringifies every field. A message whose timestamp, price, or
//! quantity fails to coerce is rejected, never stored, and never crashes
//! the stream.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::trade::{Side, TradeEvent};

/// Normalization failures. All of them result in the message being
/// dropped; the `reason` feeds the rejection counter.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// Payload is not parseable JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload parsed but is not a JSON object.
    #[error("payload is not a JSON object")]
    NotObject,

    /// A required field is missing or fails to coerce to a number.
    #[error("field {0} is missing or non-numeric")]
    NonNumeric(&'static str),

    /// Price or quantity is negative.
    #[error("field {0} is negative")]
    Negative(&'static str),
}

impl NormalizeError {
    /// Stable label for the rejection metrics counter.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Json(_) => "malformed_json",
            Self::NotObject => "not_object",
            Self::NonNumeric(_) => "non_numeric",
            Self::Negative(_) => "negative",
        }
    }
}

/// Decoder for raw trade feed messages.
#[derive(Debug, Default, Clone)]
pub struct TradeNormalizer;

impl TradeNormalizer {
    /// Create a new normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode one raw message into a canonical trade event.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizeError`] describing why the message was
    /// rejected. Callers drop the message and log; rejection is never
    /// fatal to the stream.
    pub fn decode(&self, text: &str) -> Result<TradeEvent, NormalizeError> {
        let value: Value = serde_json::from_str(text)?;
        let obj = value.as_object().ok_or(NormalizeError::NotObject)?;

        let ts = field(obj, "ts", "T")
            .and_then(coerce_millis)
            .ok_or(NormalizeError::NonNumeric("ts"))?;

        let price = field(obj, "price", "p")
            .and_then(coerce_decimal)
            .ok_or(NormalizeError::NonNumeric("price"))?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(NormalizeError::Negative("price"));
        }

        let qty = field(obj, "qty", "q")
            .and_then(coerce_decimal)
            .ok_or(NormalizeError::NonNumeric("qty"))?;
        if qty.is_sign_negative() && !qty.is_zero() {
            return Err(NormalizeError::Negative("qty"));
        }

        let id = obj
            .get("id")
            .and_then(coerce_id)
            .unwrap_or_else(|| synthesize_id(ts, qty, price));

        let side = resolve_side(obj);

        Ok(TradeEvent::new(id, ts, price, qty, side))
    }
}

/// Look up a field under its primary name, then its abbreviated alias.
/// Explicit `null` counts as missing.
fn field<'a>(
    obj: &'a serde_json::Map<String, Value>,
    primary: &str,
    alias: &str,
) -> Option<&'a Value> {
    obj.get(primary)
        .filter(|v| !v.is_null())
        .or_else(|| obj.get(alias).filter(|v| !v.is_null()))
}

/// Coerce a JSON number or numeric string to a decimal.
fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON number or numeric string to millisecond epoch time.
#[allow(clippy::cast_possible_truncation)]
fn coerce_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// Accept an explicit id as a string, or a number rendered as a string.
fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Composite id from the trade fields plus a high-resolution local clock
/// reading. Minimizes but does not guarantee collision avoidance.
fn synthesize_id(ts: i64, qty: Decimal, price: Decimal) -> String {
    let clock = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    format!("{ts}-{qty}-{price}-{clock}")
}

/// Resolve the trade side: explicit `side` field first, then the maker
/// flag `m` (maker flag false means the buyer was the aggressor). Any
/// explicit value other than literal `"buy"` normalizes to sell.
fn resolve_side(obj: &serde_json::Map<String, Value>) -> Side {
    if let Some(side) = obj.get("side").filter(|v| !v.is_null()) {
        return if side.as_str() == Some("buy") {
            Side::Buy
        } else {
            Side::Sell
        };
    }

    match obj.get("m") {
        Some(Value::Bool(false)) => Side::Buy,
        Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("false") => Side::Buy,
        _ => Side::Sell,
    }
}

// =============================================================================
// Tests
// =============================================================================
