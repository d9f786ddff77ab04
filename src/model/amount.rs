//! Raw base-unit integers.
//!
//! Balances stay `U256` end-to-end. On the wire they travel as base-10
//! strings, and the only place they become floating point is
//! [`to_display`], which is for presentation only.

use alloy::primitives::U256;

/// Parse a base-10 integer string. Returns `None` for anything else,
/// including negative numbers, decimals and hex.
pub fn parse_raw(s: &str) -> Option<U256> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(s, 10).ok()
}

/// Divide a raw amount by `divisor` for display, keeping the fractional
/// remainder. A zero divisor yields the raw magnitude.
pub fn to_display(raw: U256, divisor: U256) -> f64 {
    if divisor.is_zero() {
        return to_f64(raw);
    }
    let whole = raw / divisor;
    let frac = raw % divisor;
    to_f64(whole) + to_f64(frac) / to_f64(divisor)
}

fn to_f64(v: U256) -> f64 {
    match u128::try_from(v) {
        Ok(small) => small as f64,
        // Beyond u128 only the leading digits matter for display.
        Err(_) => v.to_string().parse().unwrap_or(f64::MAX),
    }
}

/// `serde(with = ...)` helper: `U256` as a base-10 string.
pub mod decimal {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<U256, D::Error> {
        let s = String::deserialize(de)?;
        super::parse_raw(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid base-unit integer `{s}`")))
    }
}

/// `serde(with = ...)` helper: `Option<U256>` as an optional base-10 string.
pub mod decimal_opt {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<U256>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => ser.serialize_some(&v.to_string()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<U256>, D::Error> {
        let s: Option<String> = Option::deserialize(de)?;
        match s {
            None => Ok(None),
            Some(s) => super::parse_raw(&s).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid base-unit integer `{s}`"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw() {
        assert_eq!(parse_raw("0"), Some(U256::ZERO));
        assert_eq!(parse_raw(" 1500000 "), Some(U256::from(1_500_000u64)));
        assert_eq!(
            parse_raw("115792089237316195423570985008687907853269984665640564039457584007913129639935"),
            Some(U256::MAX)
        );
        assert_eq!(parse_raw(""), None);
        assert_eq!(parse_raw("-5"), None);
        assert_eq!(parse_raw("1.5"), None);
        assert_eq!(parse_raw("0x10"), None);
    }

    #[test]
    fn test_to_display_keeps_fraction() {
        let divisor = U256::from(1_000_000u64);
        assert_eq!(to_display(U256::from(3_500_000_000u64), divisor), 3500.0);
        assert_eq!(to_display(U256::from(1_250_000u64), divisor), 1.25);
        assert_eq!(to_display(U256::from(7u64), U256::ZERO), 7.0);
    }
}
