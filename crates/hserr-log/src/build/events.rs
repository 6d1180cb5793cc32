//! The bounded event logs: `Compilation events (20 events):` and friends.
//!
//! Every log shares one grammar; the kind records which log a row came from.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{self, Built, Fields};
use crate::classify::is_header;
use crate::ir::Value;
use crate::kind::EventKind;

static LOG_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>.*?) \((?P<events>\d+) events\):").unwrap());

static EVENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Event: (?P<ts>\d+(?:\.\d+)?)\s*(?:Thread (?P<thread>0x[0-9a-fA-F]+)\s*)?(?P<detail>.*)$",
    )
    .unwrap()
});

pub(super) fn event_log(kind: EventKind, line: &str) -> Built {
    if is_header(kind, line) {
        let caps = LOG_HEADER.captures(line);
        return Fields::new()
            .with("name", fields::text(fields::group(&caps, "name")))
            .with("events", fields::count(fields::group(&caps, "events")))
            .done();
    }
    let t = line.trim();
    if t.is_empty() || t == "No events" {
        return Fields::new().done();
    }
    if let Some(caps) = EVENT.captures(line) {
        return Fields::new()
            .with("timestamp", fields::decimal(Some(&caps["ts"])))
            .with("thread", fields::address(caps.name("thread").map(|m| m.as_str())))
            .with("detail", fields::text(caps.name("detail").map(|m| m.as_str())))
            .done();
    }
    // Continuation of a multi-line event, such as a heap printout inside
    // `GC Heap History`.
    Fields::new().with("detail", Value::text(t)).done()
}
