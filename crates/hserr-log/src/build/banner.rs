//! The `#`-prefixed banner at the top of the report.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{self, Built, Fields, captures};
use crate::ir::Value;
use crate::kind::EventKind;
use crate::normalize::{Arch, SignalDescriptor};

static CRASH_SIGNAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^#\s+(?P<name>[A-Z][A-Z0-9_]*)\s+\((?P<code>0x[0-9a-fA-F]+)\)\s+at pc=(?P<pc>0x[0-9a-fA-F]+)?(?:,\s*pid=(?P<pid>\d+))?(?:,\s*tid=(?P<tid>(?:0x)?[0-9a-fA-F]+))?",
    )
    .unwrap()
});

static INTERNAL_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^#\s+(?P<what>Internal Error|Out of Memory Error) \((?P<loc>[^)]*)\)?(?:,\s*pid=(?P<pid>\d+))?(?:,\s*tid=(?P<tid>(?:0x)?[0-9a-fA-F]+))?",
    )
    .unwrap()
});

static FAILED_CONDITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^#\s+(?:(?P<check>assert|guarantee|precond|postcond)\((?P<cond>.*)\) failed(?P<msg>.*)|(?P<fatal>fatal error|Error):\s*(?P<emsg>.*))",
    )
    .unwrap()
});

static NATIVE_ALLOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^#\s+Native memory allocation \((?P<allocator>\w+)\) failed to (?:(?:allocate|map) (?P<bytes>\d+) bytes?(?: for (?P<purpose>.*?))?\.?\s*$)?",
    )
    .unwrap()
});

static JRE_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[^(]*?)\s*\((?P<version>[^)]*)\)(?:\s*\(build\s*(?P<build>[^)]*)\))?").unwrap()
});

static JAVA_VM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?P<vm>[^(]*?)\s*\((?P<details>.*)\)\s*$").unwrap());

static CORE_LOCATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:Default location|Location): (?P<loc>.*)$").unwrap());

/// `#` padding and banner lines whose text is the whole message.
pub(super) fn plain(_kind: EventKind, _line: &str) -> Built {
    Fields::new().done()
}

pub(super) fn crash_signal(kind: EventKind, line: &str) -> Built {
    let caps = captures(&CRASH_SIGNAL, kind, line)?;
    let name = &caps["name"];
    let code = &caps["code"];
    let descriptor = if name.starts_with("SIG") {
        let number = u32::from_str_radix(code.trim_start_matches("0x"), 16).ok();
        SignalDescriptor::posix(Some(name), number, None, None, None)
    } else {
        let code = u32::from_str_radix(code.trim_start_matches("0x"), 16)
            .ok()
            .or_else(|| SignalDescriptor::windows_code_for(name))
            .unwrap_or_default();
        SignalDescriptor::windows(code, None, None)
    };
    let mut f = Fields::new()
        .with("signal", Value::Signal(descriptor))
        .with("pc", fields::address(caps.name("pc").map(|m| m.as_str())))
        .with("pid", fields::count(caps.name("pid").map(|m| m.as_str())));
    f.push("tid", thread_id(caps.name("tid").map(|m| m.as_str())));
    f.done()
}

/// Decimal on current JDKs, `0x`-hex on 8.
fn thread_id(tid: Option<&str>) -> Value {
    match tid {
        Some(t) if t.starts_with("0x") => fields::address(Some(t)),
        Some(t) => fields::count(Some(t)),
        None => Value::Absent,
    }
}

pub(super) fn internal_error(kind: EventKind, line: &str) -> Built {
    let caps = captures(&INTERNAL_ERROR, kind, line)?;
    let what = match &caps["what"] {
        "Out of Memory Error" => "out-of-memory",
        _ => "internal",
    };
    let location = caps["loc"].trim();
    let (file, source_line) = match location.rsplit_once(':') {
        Some((file, n)) if n.chars().all(|c| c.is_ascii_digit()) && !n.is_empty() => {
            (Some(file), Some(n))
        }
        _ => (Some(location), None),
    };
    Fields::new()
        .with("error", Value::text(what))
        .with("file", fields::text(file))
        .with("line", fields::count(source_line))
        .with("pid", fields::count(caps.name("pid").map(|m| m.as_str())))
        .with("tid", thread_id(caps.name("tid").map(|m| m.as_str())))
        .done()
}

pub(super) fn failed_condition(kind: EventKind, line: &str) -> Built {
    let caps = captures(&FAILED_CONDITION, kind, line)?;
    if let Some(check) = caps.name("check") {
        return Fields::new()
            .with("check", Value::text(check.as_str()))
            .with("condition", fields::text(caps.name("cond").map(|m| m.as_str())))
            .with(
                "message",
                fields::text(caps.name("msg").map(|m| m.as_str().trim_start_matches(':'))),
            )
            .done();
    }
    let check = match caps.name("fatal").map(|m| m.as_str()) {
        Some("fatal error") => "fatal",
        _ => "error",
    };
    Fields::new()
        .with("check", Value::text(check))
        .with("condition", Value::Absent)
        .with("message", fields::text(caps.name("emsg").map(|m| m.as_str())))
        .done()
}

pub(super) fn native_allocation(kind: EventKind, line: &str) -> Built {
    let caps = captures(&NATIVE_ALLOCATION, kind, line)?;
    Fields::new()
        .with("allocator", Value::text(&caps["allocator"]))
        .with("size", fields::size(caps.name("bytes").map(|m| m.as_str())))
        .with("purpose", fields::text(caps.name("purpose").map(|m| m.as_str())))
        .done()
}

pub(super) fn jre_version(_kind: EventKind, line: &str) -> Built {
    let rest = fields::tail(line);
    let Some(caps) = JRE_VERSION.captures(rest) else {
        return Fields::new()
            .with("runtime", fields::text(Some(rest)))
            .with("version", Value::Absent)
            .with("build", Value::Absent)
            .done();
    };
    Fields::new()
        .with("runtime", fields::text(caps.name("name").map(|m| m.as_str())))
        .with("version", fields::text(caps.name("version").map(|m| m.as_str())))
        .with("build", fields::text(caps.name("build").map(|m| m.as_str())))
        .done()
}

/// `# Java VM: OpenJDK 64-Bit Server VM (17.0.8+7, mixed mode, sharing, tiered, ..., g1 gc, linux-amd64)`
/// and the space-separated JDK 8 form `(25.292-b10 mixed mode linux-amd64 compressed oops)`.
pub(super) fn java_vm(_kind: EventKind, line: &str) -> Built {
    let rest = fields::tail(line);
    let Some(caps) = JAVA_VM.captures(rest) else {
        return Fields::new()
            .with("vm", fields::text(Some(rest)))
            .with("details", Value::List(Vec::new()))
            .with("platform", Value::Absent)
            .with("arch", Value::Absent)
            .done();
    };
    let details = &caps["details"];
    let platform = details
        .split([',', ' '])
        .map(str::trim)
        .find(|t| t.contains('-') && Arch::from_token(t).is_some());
    Fields::new()
        .with("vm", fields::text(Some(&caps["vm"])))
        .with("details", fields::list(details.split(',')))
        .with("platform", fields::text(platform))
        .with("arch", platform.and_then(Arch::from_token).map_or(Value::Absent, Value::Arch))
        .done()
}

pub(super) fn core_dump(_kind: EventKind, line: &str) -> Built {
    let body = line.trim_start_matches('#').trim();
    let written = !(body.starts_with("No core dump") || body.starts_with("Failed to write"));
    let location = CORE_LOCATION
        .captures(body)
        .and_then(|c| c.name("loc"))
        .map(|m| m.as_str());
    Fields::new()
        .with("written", Value::Flag(written))
        .with("location", fields::text(location))
        .done()
}
