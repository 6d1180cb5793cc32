//! Stack frame rows for `Problematic frame`, `Native frames` and
//! `Java frames`.
//!
//! ```text
//! C  [libc.so.6+0x18b1e1]  __memmove_avx_unaligned_erms+0x1d1
//! V  [libjvm.so+0x5e3c8a]  ClassFileParser::parse_stream(ClassFileStream const*, JavaThread*)+0x3a
//! j  TestCrash.main([Ljava/lang/String;)V+5
//! J 1234 c2 java.lang.String.hashCode()I java.base@17.0.8 (49 bytes) @ 0x00007f3a3c2d4f4c [0x00007f3a3c2d4e00+0x000000000000014c]
//! v  ~StubRoutines::call_stub
//! C  0x0000000000000000
//! ...<more frames>...
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{self, Built, Fields};
use crate::classify::is_header;
use crate::error::GrammarDefect;
use crate::ir::{FrameMarker, FrameTag, StackFrame, Value};
use crate::kind::EventKind;
use crate::normalize::HexAddress;

static LIBRARY_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(?P<lib>[^\]]+?)(?:\+(?P<off>0x[0-9a-fA-F]+))?\]\s*(?P<sym>.*)$").unwrap()
});

static COMPILED_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\d+%?\s+)?(?:(?:[cC][12]|JVMCI|jvmci)\s+)?(?P<sym>\S+)(?:.*?@\s*(?P<pc>0x[0-9a-fA-F]+))?",
    )
    .unwrap()
});

static LEGEND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((?P<legend>.*)\)\s*$").unwrap());

/// Header, frame row or marker of any of the three frame sections.
pub(super) fn frame_section(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        let legend = LEGEND
            .captures(line)
            .and_then(|c| c.name("legend"))
            .map(|m| m.as_str());
        return Fields::new()
            .with("legend", fields::text(legend))
            .done();
    }
    let row = if kind == EventKind::ProblematicFrame {
        line.trim_start_matches('#')
    } else {
        line
    };
    match parse_row(row) {
        Some(Row::Frame(frame)) => Fields::new().with("frame", Value::Frame(frame)).done(),
        Some(Row::Marker(marker)) => Fields::new().with("marker", Value::Marker(marker)).done(),
        None if line.trim().is_empty() => Fields::new().done(),
        None => Err(GrammarDefect::rejected(kind, line)),
    }
}

/// `Thread being processed: ...` outside a frame list.
pub(super) fn thread_being_processed(_kind: EventKind, line: &str) -> Built {
    let rest = line
        .trim_start_matches("Thread being processed")
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    Fields::new()
        .with("thread", fields::address(rest.split_whitespace().next()))
        .with("detail", fields::text(Some(rest)))
        .done()
}

enum Row {
    Frame(StackFrame),
    Marker(FrameMarker),
}

fn parse_row(row: &str) -> Option<Row> {
    let row = row.trim();
    if row.starts_with("...") && row.contains("more frames") {
        return Some(Row::Marker(FrameMarker::Elided));
    }
    if row.starts_with("Thread being processed") {
        return Some(Row::Marker(FrameMarker::ThreadBeingProcessed));
    }

    let mut chars = row.chars();
    let tag = FrameTag::from_column(chars.next()?)?;
    let rest = chars.as_str();
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();
    let mut frame = StackFrame {
        tag,
        library: None,
        offset: None,
        symbol: None,
        address: None,
    };

    if let Some(caps) = LIBRARY_FRAME.captures(rest) {
        frame.library = Some(caps["lib"].trim().to_string());
        frame.offset = caps
            .name("off")
            .and_then(|m| HexAddress::parse(m.as_str()).ok());
        frame.symbol = non_empty(caps.name("sym").map(|m| m.as_str()));
    } else if rest.starts_with("0x")
        && let Ok(pc) = HexAddress::parse(rest.split_whitespace().next().unwrap_or(rest))
    {
        frame.address = Some(pc);
    } else if tag == FrameTag::Compiled
        && let Some(caps) = COMPILED_FRAME.captures(rest)
    {
        frame.symbol = non_empty(caps.name("sym").map(|m| m.as_str()));
        frame.address = caps
            .name("pc")
            .and_then(|m| HexAddress::parse(m.as_str()).ok());
    } else {
        frame.symbol = non_empty(Some(rest));
    }
    Some(Row::Frame(frame))
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
