//! `siginfo:` and the `Signal Handlers:` table.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{self, Built, Fields};
use crate::classify::is_header;
use crate::ir::Value;
use crate::kind::EventKind;
use crate::normalize::{HexAddress, MemoryAccess, SignalDescriptor};

static POSIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"si_signo:\s*(?P<num>\d+)(?:\s*\((?P<name>\w+)\))?(?:,\s*si_code:\s*(?P<code>-?\d+)(?:\s*\((?P<code_name>\w+)\))?)?(?:.*?si_addr:\s*(?P<addr>0x[0-9a-fA-F]+))?",
    )
    .unwrap()
});

static WINDOWS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<name>(?:EXCEPTION|STATUS)_\w+)\s*\((?P<code>0x[0-9a-fA-F]+)\)|ExceptionCode=(?P<raw>0x[0-9a-fA-F]+))(?:,\s*(?P<access>reading|writing|data execution prevention violation)(?: at)? address (?P<addr>0x[0-9a-fA-F]+))?",
    )
    .unwrap()
});

static HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?P<signal>SIG[A-Z0-9]+):\s*(?P<rest>.*)$").unwrap());
static MASK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:sa_)?mask(?:\[0\])?=(?P<mask>[01]+)").unwrap());
static FLAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:sa_)?flags=(?P<flags>[A-Z_|]+|none)").unwrap());

/// Reads a `siginfo` description, with or without its `siginfo:` label.
///
/// ```text
/// si_signo: 11 (SIGSEGV), si_code: 1 (SEGV_MAPERR), si_addr: 0x0000000000000000
/// EXCEPTION_ACCESS_VIOLATION (0xc0000005), reading address 0x0000000000000000
/// ExceptionCode=0xc0000005, writing address 0x00000000deadbeef
/// ```
pub fn parse_signal(text: &str) -> Option<SignalDescriptor> {
    let text = text.trim();
    let text = text.strip_prefix("siginfo:").map_or(text, str::trim);

    if let Some(caps) = POSIX.captures(text) {
        let number = caps["num"].parse::<u32>().ok();
        let code = caps.name("code").and_then(|m| m.as_str().parse::<i64>().ok());
        let address = caps
            .name("addr")
            .and_then(|m| HexAddress::parse(m.as_str()).ok());
        return Some(SignalDescriptor::posix(
            caps.name("name").map(|m| m.as_str()),
            number,
            caps.name("code_name").map(|m| m.as_str()),
            code,
            address,
        ));
    }

    let caps = WINDOWS.captures(text)?;
    let code = caps
        .name("code")
        .or_else(|| caps.name("raw"))
        .and_then(|m| u32::from_str_radix(m.as_str().trim_start_matches("0x"), 16).ok())
        .or_else(|| {
            caps.name("name")
                .and_then(|m| SignalDescriptor::windows_code_for(m.as_str()))
        })?;
    let access = caps.name("access").map(|m| match m.as_str() {
        "reading" => MemoryAccess::Read,
        "writing" => MemoryAccess::Write,
        _ => MemoryAccess::Execute,
    });
    let address = caps
        .name("addr")
        .and_then(|m| HexAddress::parse(m.as_str()).ok());
    Some(SignalDescriptor::windows(code, access, address))
}

pub(super) fn siginfo(_kind: EventKind, line: &str) -> Built {
    Fields::new()
        .with("signal", parse_signal(line).map_or(Value::Absent, Value::Signal))
        .done()
}

/// One row of `Signal Handlers:`.
///
/// ```text
///    SIGSEGV: crash_handler in libjvm.so, mask=11100100010111111101111111111110, flags=SA_RESTART|SA_SIGINFO
/// SIGBUS: [libjvm.so+0x9a8ba0], sa_mask[0]=11111111011111111101111111111110, sa_flags=SA_RESTART|SA_SIGINFO
///   *** Handler was modified!
/// ```
pub(super) fn signal_handlers(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        return Fields::new().done();
    }
    let t = line.trim();
    if let Some(note) = t.strip_prefix("***") {
        return Fields::new().with("note", fields::text(Some(note))).done();
    }
    let caps = fields::captures(&HANDLER, kind, line)?;
    let rest = &caps["rest"];
    let handler = rest.split(", ").next().map(str::trim);
    let mask = MASK
        .captures(rest)
        .and_then(|c| c.name("mask"))
        .map(|m| m.as_str());
    let flags = FLAGS
        .captures(rest)
        .and_then(|c| c.name("flags"))
        .map_or("", |m| m.as_str());
    let flags = if flags == "none" { "" } else { flags };
    Fields::new()
        .with("signal", Value::text(&caps["signal"]))
        .with("handler", fields::text(handler))
        .with("mask", fields::text(mask))
        .with("flags", fields::list(flags.split('|')))
        .with(
            "unblocked",
            Value::Flag(rest.split(", ").any(|part| part.trim() == "unblocked")),
        )
        .done()
}
