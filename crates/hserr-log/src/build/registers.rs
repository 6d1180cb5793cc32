//! Register dumps, hex dumps and the free-text memory mappings that
//! annotate them.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{self, Built, Fields};
use crate::classify::is_header;
use crate::ir::Value;
use crate::kind::EventKind;

static REGISTER_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<name>[A-Za-z][A-Za-z0-9_\[\]]*)\s*=\s*(?P<value>0x[0-9a-fA-F]+)").unwrap()
});

static NAMED_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<name>[A-Za-z][A-Za-z0-9_]*)\s*=\s*(?P<rest>.*)$").unwrap()
});

static DUMP_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((?P<which>sp|pc)=(?P<addr>0x[0-9a-fA-F]+)\)").unwrap());

static DUMP_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?P<addr>0x[0-9a-fA-F]+):\s+(?P<words>.*)$").unwrap());

static STACK_SLOT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^stack at sp \+ (?P<slot>\d+) slots?:\s*(?P<rest>.*)$").unwrap()
});

/// `RAX=0x0000000000000000, RBX=0x00007f3a44012345, ...`
///
/// One `Address` field per register, named in upper case so `x0` on
/// AArch64 and `X0` elsewhere agree.
pub(super) fn registers(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) || line.trim().is_empty() {
        return Fields::new().done();
    }
    let mut f = Fields::new();
    for caps in REGISTER_PAIR.captures_iter(line) {
        f.push(
            caps["name"].to_ascii_uppercase(),
            fields::address(Some(&caps["value"])),
        );
    }
    f.done()
}

/// Splits `<value> <description>` where the value is a leading hex word.
fn value_and_description(rest: &str) -> (Value, Value) {
    let rest = rest.trim();
    match rest.split_once(char::is_whitespace) {
        Some((first, description)) if first.starts_with("0x") => (
            fields::address(Some(first.trim_end_matches(','))),
            fields::text(Some(description)),
        ),
        None if rest.starts_with("0x") => (fields::address(Some(rest)), Value::Absent),
        _ => (Value::Absent, fields::text(Some(rest))),
    }
}

/// `Register to memory mapping:` rows such as
/// `RBX=0x00007f3a44012345 is a thread` and their indented detail lines.
pub(super) fn register_mapping(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) || line.trim().is_empty() {
        return Fields::new().done();
    }
    let Some(caps) = NAMED_VALUE.captures(line) else {
        return Fields::new()
            .with("description", fields::text(Some(line)))
            .done();
    };
    let (value, description) = value_and_description(&caps["rest"]);
    Fields::new()
        .with("register", Value::text(caps["name"].to_ascii_uppercase()))
        .with("value", value)
        .with("description", description)
        .done()
}

/// `Top of Stack:` and `Instructions:` dumps.
pub(super) fn hex_dump(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        let caps = DUMP_HEADER.captures(line);
        let name = match kind {
            EventKind::Instructions => "pc",
            _ => "sp",
        };
        return Fields::new()
            .with(
                name,
                fields::address(caps.as_ref().and_then(|c| c.name("addr")).map(|m| m.as_str())),
            )
            .done();
    }
    let caps = fields::captures(&DUMP_ROW, kind, line)?;
    Fields::new()
        .with("address", fields::address(Some(&caps["addr"])))
        .with("words", fields::list(caps["words"].split_whitespace()))
        .done()
}

/// `stack at sp + 1 slots: 0x00007f3a44012345 is a thread` and the lines
/// describing each slot.
pub(super) fn stack_slot_mapping(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) || line.trim().is_empty() {
        return Fields::new().done();
    }
    let Some(caps) = STACK_SLOT.captures(line) else {
        return Fields::new()
            .with("description", fields::text(Some(line)))
            .done();
    };
    let (value, description) = value_and_description(&caps["rest"]);
    Fields::new()
        .with("slot", fields::count(Some(&caps["slot"])))
        .with("value", value)
        .with("description", description)
        .done()
}
