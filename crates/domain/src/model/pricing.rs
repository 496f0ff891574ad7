use super::DjSettings;

/// Price per character, in cents, applied when a DJ never saved settings.
pub const DEFAULT_PRICE_PER_CHAR: i64 = 10;

/// Computes the payment owed for `content`: the DJ's per-character price
/// times the number of characters (Unicode scalar values, not bytes).
pub fn quote_message(content: &str, settings: Option<&DjSettings>) -> i64 {
    let price = settings.map_or(DEFAULT_PRICE_PER_CHAR, |s| s.price_per_char);
    let chars = i64::try_from(content.chars().count()).unwrap_or(i64::MAX);
    price.max(0).saturating_mul(chars)
}
