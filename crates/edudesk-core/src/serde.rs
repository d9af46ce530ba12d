//! Lenient deserializers for query strings and loosely-typed request bodies.
//!
//! Query parameters arrive as strings and browsers happily send `?page=`
//! for an untouched input; these helpers turn such blanks into `None`
//! instead of rejecting the whole request.

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Deserializes an optional string into an optional i64; blank means `None`.
pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_parsed(deserializer)
}

/// Deserializes an optional string, trimming it; blank means `None`.
pub fn deserialize_optional_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Deserializes an optional string through `FromStr`; blank means `None`.
///
/// Used for typed IDs and enum filters in query strings.
pub fn deserialize_optional_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse::<T>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Wraps any present value in `Some`, so `Option<Option<T>>` fields can tell
/// "absent" (`None`) apart from an explicit `null` (`Some(None)`).
///
/// Use together with `#[serde(default)]`.
pub fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(Decimal),
    Text(String),
}

/// Deserializes a money amount, treating anything unparseable as zero.
///
/// Accepts JSON numbers and numeric strings. `null`, blank strings and
/// garbage all become `0`. The result is rounded to cents.
pub fn deserialize_amount_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawAmount> = Option::deserialize(deserializer)?;
    Ok(normalize_amount(raw))
}

/// Optional variant of [`deserialize_amount_or_zero`]: a missing field stays `None`,
/// but a present-yet-unparseable value becomes zero.
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawAmount> = Option::deserialize(deserializer)?;
    Ok(Some(normalize_amount(raw)))
}

fn normalize_amount(raw: Option<RawAmount>) -> Decimal {
    let amount = match raw {
        Some(RawAmount::Number(value)) => value,
        Some(RawAmount::Text(text)) => text.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO),
        None => Decimal::ZERO,
    };
    amount.round_dp(2)
}
