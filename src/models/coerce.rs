//! Lenient field decoding shared by the review and dealership shapes.
//!
//! Fixture files and client payloads are loosely typed: numbers sometimes
//! arrive as strings and flags as `"true"`/`"yes"`. These helpers accept the
//! same spellings the store schema casts on write.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseInt {
    fn into_i64<E: de::Error>(self) -> Result<i64, E> {
        match self {
            LooseInt::Int(n) => Ok(n),
            LooseInt::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
            LooseInt::Float(f) => Err(E::custom(format!("expected an integer, found {}", f))),
            LooseInt::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected an integer, found '{}'", s))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseBool {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Cast a path segment the way the store's query casting does for numeric
/// fields: trimmed decimal or exponent form, `0x`/`0o`/`0b` prefixes,
/// `Infinity`, and the empty string as 0. `None` means the cast fails.
pub fn cast_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.is_empty() {
                return None;
            }
            return digits.chars().try_fold(0.0_f64, |acc, c| {
                c.to_digit(radix)
                    .map(|d| acc * f64::from(radix) + f64::from(d))
            });
        }
    }

    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    // str::parse also takes "inf" and "NaN", which do not cast
    if s.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return None;
    }
    s.parse().ok()
}

/// Whole numbers within `i64` range; anything else cannot equal an integer id.
pub fn whole(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 9.2e18).then_some(value as i64)
}

pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    LooseInt::deserialize(deserializer)?.into_i64()
}

pub fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Option::<LooseInt>::deserialize(deserializer)?
        .map(LooseInt::into_i64)
        .transpose()
}

pub fn boolean<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match LooseBool::deserialize(deserializer)? {
        LooseBool::Bool(b) => Ok(b),
        LooseBool::Int(1) => Ok(true),
        LooseBool::Int(0) => Ok(false),
        LooseBool::Int(n) => Err(de::Error::custom(format!("expected a boolean, found {}", n))),
        LooseBool::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(de::Error::custom(format!("expected a boolean, found '{}'", s))),
        },
    }
}
