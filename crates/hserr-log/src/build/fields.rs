//! Helpers shared by the per-family builders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::GrammarDefect;
use crate::ir::{Field, Value};
use crate::kind::EventKind;
use crate::normalize::{ByteSize, HexAddress};

pub(crate) type Built = Result<Vec<Field>, GrammarDefect>;

/// Ordered field accumulator.
#[derive(Debug, Default)]
pub(crate) struct Fields(Vec<Field>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.0.push(Field::new(name, value));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.0.push(Field::new(name, value));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn done(self) -> Built {
        Ok(self.0)
    }
}

pub(crate) fn captures<'l>(
    re: &Regex,
    kind: EventKind,
    line: &'l str,
) -> Result<Captures<'l>, GrammarDefect> {
    re.captures(line)
        .ok_or_else(|| GrammarDefect::rejected(kind, line))
}

/// Text of group `name` when `caps` matched and the group took part.
pub(crate) fn group<'h>(caps: &Option<Captures<'h>>, name: &str) -> Option<&'h str> {
    caps.as_ref().and_then(|c| c.name(name)).map(|m| m.as_str())
}

/// Text after the first `:`; the whole line when there is none.
pub(crate) fn tail(line: &str) -> &str {
    line.split_once(':').map_or(line, |(_, rest)| rest).trim()
}

pub(crate) fn text(s: Option<&str>) -> Value {
    Value::text_or_absent(s)
}

/// Text after a label that is on the line; empty stays `Text("")`.
pub(crate) fn present(s: &str) -> Value {
    Value::text_present(s)
}

pub(crate) fn size(s: Option<&str>) -> Value {
    s.and_then(|s| ByteSize::parse(s).ok())
        .map_or(Value::Absent, Value::Size)
}

pub(crate) fn count(s: Option<&str>) -> Value {
    s.and_then(|s| s.trim().parse::<u64>().ok())
        .map_or(Value::Absent, Value::Count)
}

pub(crate) fn decimal(s: Option<&str>) -> Value {
    s.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite())
        .map_or(Value::Absent, Value::Decimal)
}

pub(crate) fn address(s: Option<&str>) -> Value {
    s.and_then(|s| HexAddress::parse(s).ok())
        .map_or(Value::Absent, Value::Address)
}

pub(crate) fn range(bounds: &[Option<&str>]) -> Value {
    let parsed: Option<Vec<HexAddress>> = bounds
        .iter()
        .map(|b| b.and_then(|b| HexAddress::parse(b).ok()))
        .collect();
    match parsed {
        Some(r) if !r.is_empty() => Value::Range(r),
        _ => Value::Absent,
    }
}

pub(crate) fn list<'a>(items: impl IntoIterator<Item = &'a str>) -> Value {
    Value::List(
        items
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

static SIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?\s*[A-Za-z]+$").unwrap());

/// Best typed reading of a free value: count, signed integer, address, size
/// with a unit, decimal, else text. Empty input is `Absent`.
pub(crate) fn scalar(s: &str) -> Value {
    let t = s.trim().trim_end_matches('.');
    if t.is_empty() {
        return Value::Absent;
    }
    if let Ok(n) = t.parse::<u64>() {
        return Value::Count(n);
    }
    if let Ok(n) = t.parse::<i64>() {
        return Value::Integer(n);
    }
    if t.starts_with("0x")
        && let Ok(a) = HexAddress::parse(t)
    {
        return Value::Address(a);
    }
    if SIZED.is_match(t)
        && let Ok(size) = ByteSize::parse(t)
    {
        return Value::Size(size);
    }
    if let Ok(d) = t.parse::<f64>()
        && d.is_finite()
    {
        return Value::Decimal(d);
    }
    Value::Text(s.trim().to_string())
}

/// `key: value` with a typed value; the key keeps its spelling. A key with
/// nothing after it reads as `Text("")`.
pub(crate) fn key_value(line: &str, sep: char) -> Option<(&str, Value)> {
    let (key, value) = line.split_once(sep)?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = match scalar(value) {
        Value::Absent => present(value),
        typed => typed,
    };
    Some((key, value))
}

/// A `key: value` row as `key` and `value` fields, or `detail` when the line
/// has no key.
pub(crate) fn keyed_row(line: &str) -> Built {
    match key_value(line, ':') {
        Some((key, value)) => Fields::new()
            .with("key", Value::text(key))
            .with("value", value)
            .done(),
        None => Fields::new().with("detail", text(Some(line))).done(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_readings() {
        assert_eq!(scalar(" 42 "), Value::Count(42));
        assert_eq!(scalar("-6"), Value::Integer(-6));
        assert_eq!(scalar("0x1f"), Value::Address(HexAddress::new(0x1f)));
        assert_eq!(scalar("15G"), Value::Size(ByteSize::from_bytes(15 << 30)));
        assert_eq!(scalar("1234567 k"), Value::Size(ByteSize::from_bytes(1234567 * 1024)));
        assert_eq!(scalar("0.52"), Value::Decimal(0.52));
        assert_eq!(scalar("65536."), Value::Count(65536));
        assert_eq!(scalar("no quota"), Value::text("no quota"));
        assert_eq!(scalar("  "), Value::Absent);
    }

    #[test]
    fn test_empty_value_after_key_is_present() {
        assert_eq!(key_value("cpu_memory_nodes:", ':'), Some(("cpu_memory_nodes", Value::text(""))));
        assert_eq!(key_value(": 12", ':'), None);
    }

    #[test]
    fn test_unknown_unit_stays_text() {
        assert_eq!(scalar("4 total"), Value::text("4 total"));
    }

    #[test]
    fn test_range_requires_every_bound() {
        assert_eq!(range(&[Some("0x1"), None]), Value::Absent);
        assert_eq!(
            range(&[Some("0x1"), Some("0x2")]),
            Value::Range(vec![HexAddress::new(1), HexAddress::new(2)])
        );
    }
}

/// Value of the first field named `name`; panics when missing.
#[cfg(test)]
pub(crate) fn get<'a>(fields: &'a [Field], name: &str) -> &'a Value {
    match fields.iter().find(|f| f.name == name) {
        Some(f) => &f.value,
        None => panic!("Expected field `{name}` in {fields:?}"),
    }
}
