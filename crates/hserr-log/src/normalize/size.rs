use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

static SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<num>\d+(?:\.\d+)?)\s*(?P<unit>[A-Za-z]*)\.?\s*$").unwrap()
});

/// Unit suffix of a size value. Every unit is a power of 1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeUnit {
    Bytes,
    Kilo,
    Mega,
    Giga,
    Tera,
}

impl SizeUnit {
    pub fn multiplier(self) -> u64 {
        match self {
            SizeUnit::Bytes => 1,
            SizeUnit::Kilo => 1 << 10,
            SizeUnit::Mega => 1 << 20,
            SizeUnit::Giga => 1 << 30,
            SizeUnit::Tera => 1 << 40,
        }
    }

    /// Recognizes the unit spellings HotSpot and the kernel print:
    /// `k`, `K`, `kB`, `KB`, `Kb`, `KiB` and the same for M, G and T.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" | "b" | "B" | "byte" | "bytes" => Some(SizeUnit::Bytes),
            "k" | "K" | "kb" | "kB" | "KB" | "Kb" | "KiB" => Some(SizeUnit::Kilo),
            "m" | "M" | "mb" | "mB" | "MB" | "Mb" | "MiB" => Some(SizeUnit::Mega),
            "g" | "G" | "gb" | "gB" | "GB" | "Gb" | "GiB" => Some(SizeUnit::Giga),
            "t" | "T" | "tb" | "tB" | "TB" | "Tb" | "TiB" => Some(SizeUnit::Tera),
            _ => None,
        }
    }
}

/// A size normalized to a canonical byte count.
///
/// `"1048576 kB"`, `"1024 MB"` and `"1G"` are all the same `ByteSize`.
/// Decimal magnitudes (`"5.12 MB"`, as printed by the metaspace report) are
/// rounded to the nearest byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const ZERO: ByteSize = ByteSize(0);

    pub fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub fn from_parts(magnitude: u64, unit: SizeUnit) -> Self {
        Self(magnitude.saturating_mul(unit.multiplier()))
    }

    pub fn bytes(self) -> u64 {
        self.0
    }

    pub fn parse(text: &str) -> Result<Self, NormalizeError> {
        let caps = SIZE
            .captures(text)
            .ok_or_else(|| NormalizeError::ByteSize(text.to_string()))?;
        let unit = SizeUnit::from_suffix(&caps["unit"])
            .ok_or_else(|| NormalizeError::ByteSize(text.to_string()))?;
        let num = &caps["num"];
        if num.contains('.') {
            let magnitude: f64 = num
                .parse()
                .map_err(|_| NormalizeError::ByteSize(text.to_string()))?;
            // `as` saturates on overflow, which keeps the conversion total.
            Ok(Self((magnitude * unit.multiplier() as f64).round() as u64))
        } else {
            let magnitude: u64 = num.parse().unwrap_or(u64::MAX);
            Ok(Self::from_parts(magnitude, unit))
        }
    }
}

impl FromStr for ByteSize {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ByteSize {
    /// Prints the largest unit that divides the value exactly, HotSpot style.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = [
            (SizeUnit::Tera, "T"),
            (SizeUnit::Giga, "G"),
            (SizeUnit::Mega, "M"),
            (SizeUnit::Kilo, "K"),
        ];
        if self.0 != 0 {
            for (unit, suffix) in units {
                if self.0 % unit.multiplier() == 0 {
                    return write!(f, "{}{}", self.0 / unit.multiplier(), suffix);
                }
            }
        }
        write!(f, "{}B", self.0)
    }
}

/// One side of a resource limit: either unbounded or a concrete amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type", content = "value")]
pub enum LimitValue {
    Infinity,
    Amount(u64),
}

impl LimitValue {
    /// `infinity`/`unlimited` or a number with an optional `k` suffix.
    /// Amounts with a unit suffix are converted to bytes.
    pub fn parse(text: &str) -> Result<Self, NormalizeError> {
        let t = text.trim();
        match t {
            "infinity" | "unlimited" => Ok(LimitValue::Infinity),
            _ if t.chars().all(|c| c.is_ascii_digit()) && !t.is_empty() => t
                .parse()
                .map(LimitValue::Amount)
                .map_err(|_| NormalizeError::Limit(t.to_string())),
            _ => ByteSize::parse(t)
                .map(|size| LimitValue::Amount(size.bytes()))
                .map_err(|_| NormalizeError::Limit(t.to_string())),
        }
    }
}

/// A soft limit with an optional hard limit (`rlimit (soft/hard)` rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    pub soft: LimitValue,
    pub hard: Option<LimitValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_are_base_1024() {
        let a = ByteSize::parse("1048576 kB").unwrap();
        let b = ByteSize::parse("1024 MB").unwrap();
        let c = ByteSize::parse("1 GB").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c.bytes(), 1 << 30);
    }

    #[test]
    fn test_hotspot_suffixes() {
        assert_eq!(ByteSize::parse("78656K").unwrap().bytes(), 78656 * 1024);
        assert_eq!(ByteSize::parse("2048m").unwrap().bytes(), 2048 << 20);
        assert_eq!(ByteSize::parse("31G").unwrap().bytes(), 31 << 30);
        assert_eq!(ByteSize::parse("245760Kb").unwrap().bytes(), 245760 * 1024);
        assert_eq!(ByteSize::parse("65536.").unwrap().bytes(), 65536);
        assert_eq!(ByteSize::parse("123").unwrap().bytes(), 123);
    }

    #[test]
    fn test_decimal_magnitude() {
        assert_eq!(ByteSize::parse("1.00 GB").unwrap().bytes(), 1 << 30);
        assert_eq!(ByteSize::parse("0.5 KB").unwrap().bytes(), 512);
        assert_eq!(ByteSize::parse("5.12 MB").unwrap().bytes(), 5_368_709);
    }

    #[test]
    fn test_rejects_unknown_unit() {
        assert!(ByteSize::parse("12 parsecs").is_err());
        assert!(ByteSize::parse("").is_err());
        assert!(ByteSize::parse("K").is_err());
    }

    #[test]
    fn test_overflow_saturates() {
        let huge = ByteSize::parse("99999999999999999999 T").unwrap();
        assert_eq!(huge.bytes(), u64::MAX);
    }

    #[test]
    fn test_display_picks_exact_unit() {
        assert_eq!(ByteSize::from_bytes(1 << 30).to_string(), "1G");
        assert_eq!(ByteSize::from_bytes(1536).to_string(), "1536B");
        assert_eq!(ByteSize::from_bytes(3 << 10).to_string(), "3K");
        assert_eq!(ByteSize::ZERO.to_string(), "0B");
    }

    #[test]
    fn test_limit_values() {
        assert_eq!(LimitValue::parse("infinity").unwrap(), LimitValue::Infinity);
        assert_eq!(LimitValue::parse("4096").unwrap(), LimitValue::Amount(4096));
        assert_eq!(LimitValue::parse("8192k").unwrap(), LimitValue::Amount(8192 * 1024));
        assert!(LimitValue::parse("lots").is_err());
    }
}
