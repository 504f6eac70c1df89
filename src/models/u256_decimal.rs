//! Serde helpers for `U256` values carried as decimal strings, plus
//! conversions between smallest units and human-readable amounts.

use ethers::types::U256;
use ethers::utils::{parse_units, ParseUnits};
use serde::{de, Deserializer, Serializer};
use std::fmt;

use crate::errors::CustomError;

pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;

    impl<'de> de::Visitor<'de> for Visitor {
        type Value = U256;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "a u256 encoded as a decimal string")
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            U256::from_dec_str(s).map_err(|err| {
                de::Error::custom(format!("failed to decode {:?} as decimal u256: {}", s, err))
            })
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(U256::from(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

/// Formats an amount of token units with proper decimals, trimming trailing
/// zeros.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let decimals = decimals as usize;
    let mut amount_str = amount.to_string();

    if decimals == 0 {
        return amount_str;
    }
    if amount_str.len() <= decimals {
        amount_str.insert_str(0, &"0".repeat(decimals - amount_str.len() + 1));
    }
    amount_str.insert(amount_str.len() - decimals, '.');

    amount_str
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Converts a human-readable amount into the token's smallest unit.
///
/// Only plain non-negative decimals are accepted. Digits past the token's
/// precision are truncated.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, CustomError> {
    let trimmed = amount.trim();
    let well_formed = !trimmed.is_empty()
        && trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.')
        && trimmed.matches('.').count() <= 1;
    if !well_formed {
        return Err(CustomError::InvalidAmountError(amount.to_string()));
    }

    match parse_units(trimmed, decimals as u32) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) | Err(_) => {
            Err(CustomError::InvalidAmountError(amount.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_units() {
        assert_eq!(format_units(1_337u64.into(), 0), "1337");
        assert_eq!(format_units(0u64.into(), 6), "0");
        assert_eq!(format_units(1u64.into(), 6), "0.000001");
        assert_eq!(format_units(1_000_000u64.into(), 6), "1");
        assert_eq!(format_units(1_337_000u64.into(), 6), "1.337");
        assert_eq!(format_units(U256::exp10(20), 18), "100");
    }

    #[test]
    fn parses_amounts() {
        assert_eq!(parse_amount("50", 18).unwrap(), U256::exp10(18) * 50);
        assert_eq!(parse_amount("1.5", 6).unwrap(), U256::from(1_500_000));
        assert_eq!(parse_amount(".25", 2).unwrap(), U256::from(25));
        assert_eq!(parse_amount("0", 18).unwrap(), U256::zero());
    }

    #[test]
    fn rejects_malformed_amounts() {
        for amount in ["", " ", "-1", "1.2.3", "abc", "1e18", "."] {
            assert_eq!(
                parse_amount(amount, 18),
                Err(CustomError::InvalidAmountError(amount.to_string())),
                "{amount:?}"
            );
        }
    }

    #[test]
    fn decodes_decimal_strings_and_numbers() {
        #[derive(serde::Deserialize)]
        struct Holder {
            #[serde(with = "super")]
            value: U256,
        }

        let from_str: Holder =
            serde_json::from_str(r#"{"value":"1000000000000000000000"}"#).unwrap();
        assert_eq!(from_str.value, U256::exp10(21));
        let from_num: Holder = serde_json::from_str(r#"{"value":42}"#).unwrap();
        assert_eq!(from_num.value, U256::from(42));
        assert!(serde_json::from_str::<Holder>(r#"{"value":"0x10"}"#).is_err());
    }
}
