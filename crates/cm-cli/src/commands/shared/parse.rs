use std::fmt::Display;
use std::str::FromStr;

use serde::de::DeserializeOwned;

/// Parse a snake_case enum value through its serde representation.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse through `FromStr` for types with their own lenient parsing
/// (scope digits, category labels).
pub fn parse_value<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}
