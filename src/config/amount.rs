//! Amount fields in configuration files.
//!
//! Amounts are written in the chain's smallest unit, either as a TOML integer
//! (up to `u64::MAX`) or as a decimal / `0x` hex string for larger values.

use serde::{de::Error as _, Deserialize, Deserializer};
use std::str::FromStr;

use crate::blockchain::types::Amount;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Int(u64),
    Text(String),
}

/// Parse a decimal or `0x`-prefixed hex amount.
pub fn parse_amount(text: &str) -> Result<Amount, String> {
    let text = text.trim().replace('_', "");
    if text.is_empty() {
        return Err("empty amount".to_string());
    }
    if text.starts_with('-') {
        return Err(format!("negative amount {}", text));
    }
    Amount::from_str(&text).map_err(|e| format!("invalid amount {:?}: {}", text, e))
}

/// `deserialize_with` helper for `Option<Amount>` fields.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawAmount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawAmount::Int(value)) => Ok(Some(Amount::from(value))),
        Some(RawAmount::Text(text)) => parse_amount(&text).map(Some).map_err(D::Error::custom),
    }
}
