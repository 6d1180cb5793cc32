#![no_main]
use hserr_log::{CrashLogParser, parse_document};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Crash logs are written by dying processes; lossy conversion keeps
    // almost-text inputs in play.
    let s = String::from_utf8_lossy(data);
    let doc = parse_document(s.lines());
    assert_eq!(doc.events.len(), s.lines().count());

    // Same input through the streaming front end, split at the midpoint.
    let mid = (0..=s.len() / 2).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
    let mut parser = CrashLogParser::new();
    let _ = parser.update(&s[..mid]);
    let _ = parser.update(&s[mid..]);
    let _ = parser.finish();
});
