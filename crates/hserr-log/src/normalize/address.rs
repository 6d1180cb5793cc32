use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NormalizeError;

static HEX_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"0[xX][0-9a-fA-F]+").unwrap());

/// A machine address or hex-encoded value.
///
/// Always displayed (and serialized) as lowercase `0x`-prefixed hex without
/// leading zeros, so `0x00007F3A00001000` and `7f3a00001000` compare and print
/// the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HexAddress(u64);

impl HexAddress {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Parses `0x...`, `0X...` or bare hex digits (as in `/proc/self/maps`).
    pub fn parse(text: &str) -> Result<Self, NormalizeError> {
        let t = text.trim();
        let digits = t
            .strip_prefix("0x")
            .or_else(|| t.strip_prefix("0X"))
            .unwrap_or(t);
        if digits.is_empty() {
            return Err(NormalizeError::HexAddress(text.to_string()));
        }
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| NormalizeError::HexAddress(text.to_string()))
    }

    /// Every `0x` token in `text`, in order. Tokens that overflow 64 bits are
    /// skipped.
    pub fn scan(text: &str) -> Vec<HexAddress> {
        HEX_TOKEN
            .find_iter(text)
            .filter_map(|m| Self::parse(m.as_str()).ok())
            .collect()
    }
}

impl FromStr for HexAddress {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HexAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl Serialize for HexAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HexAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form() {
        let a = HexAddress::parse("0x00007F3A00001000").unwrap();
        let b = HexAddress::parse("7f3a00001000").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0x7f3a00001000");
        assert_eq!(HexAddress::parse("0x0000000000000000").unwrap().to_string(), "0x0");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(HexAddress::parse("0x").is_err());
        assert!(HexAddress::parse("0xZZ").is_err());
        assert!(HexAddress::parse("0x1ffffffffffffffff").is_err());
    }

    #[test]
    fn test_scan_keeps_order() {
        let found = HexAddress::scan("bounds [0x10, 0x20, 0x30]");
        assert_eq!(
            found,
            vec![HexAddress::new(0x10), HexAddress::new(0x20), HexAddress::new(0x30)]
        );
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&HexAddress::new(0xdead)).unwrap();
        assert_eq!(json, "\"0xdead\"");
        let back: HexAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HexAddress::new(0xdead));
    }
}
