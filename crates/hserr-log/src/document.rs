//! The line loop: classify, build, advance, repeat.

use crate::build::build;
use crate::classify::classify;
use crate::ir::{Document, Event, Value};
use crate::kind::EventKind;
use crate::normalize::{Arch, OsFingerprint};
use crate::state::SectionState;

/// Classifies every line of a crash log, in order.
///
/// Produces exactly one event per input line. Trailing `\r` is stripped so
/// logs copied off Windows hosts classify the same way.
///
/// ```
/// let doc = hserr_log::parse_document(["Heap:", " garbage-first heap   total 1024K, used 512K"]);
/// assert_eq!(doc.events.len(), 2);
/// ```
pub fn parse_document<I>(lines: I) -> Document
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut assembler = Assembler::default();
    let events = lines
        .into_iter()
        .map(|line| assembler.push(line.as_ref()))
        .collect();
    assembler.into_document(events)
}

/// Per-document state threaded through the line loop.
#[derive(Debug, Default)]
struct Assembler {
    state: SectionState,
    next_index: usize,
    os: Option<OsFingerprint>,
    arch: Option<Arch>,
}

impl Assembler {
    fn push(&mut self, raw: &str) -> Event {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let kind = classify(line, &self.state);
        let event = build(kind, line).with_index(self.next_index);
        self.state = self.state.advance(&event);
        self.next_index += 1;
        self.observe(&event);
        event
    }

    /// Gathers document-level facts. OS rows merge in line order; the first
    /// architecture seen wins.
    fn observe(&mut self, event: &Event) {
        match event.kind {
            EventKind::Host | EventKind::Os | EventKind::Uname => {
                if let Some(Value::Os(os)) = event.field("os") {
                    self.os.get_or_insert_with(OsFingerprint::unknown).merge(os);
                }
            }
            _ => {}
        }
        if self.arch.is_none()
            && matches!(
                event.kind,
                EventKind::JavaVm | EventKind::VmInfo | EventKind::Uname
            )
            && let Some(Value::Arch(arch)) = event.field("arch")
        {
            self.arch = Some(arch.clone());
        }
    }

    fn into_document(self, events: Vec<Event>) -> Document {
        Document {
            events,
            os: self.os,
            arch: self.arch,
        }
    }
}

/// Incremental front end over [`parse_document`].
///
/// Accepts the log in arbitrary chunks, as it is read off a pipe or a file
/// still being written, and yields events for every complete line.
#[derive(Debug, Default)]
pub struct CrashLogParser {
    assembler: Assembler,
    buffer: String,
}

impl CrashLogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `input` and returns the events of every line it completed.
    ///
    /// A partial trailing line stays buffered until the next call or
    /// [`finish`](Self::finish).
    pub fn update(&mut self, input: &str) -> Vec<Event> {
        self.buffer.push_str(input);
        let Some(last_nl) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let complete: Vec<String> = self.buffer[..last_nl]
            .split('\n')
            .map(str::to_string)
            .collect();
        self.buffer.drain(..=last_nl);
        complete
            .iter()
            .map(|line| self.assembler.push(line))
            .collect()
    }

    /// Flushes the buffered tail, if any, and returns its event.
    pub fn finish(mut self) -> Vec<Event> {
        self.flush()
    }

    fn flush(&mut self) -> Vec<Event> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let tail = std::mem::take(&mut self.buffer);
        vec![self.assembler.push(&tail)]
    }

    /// Feeds all of `input`, flushes, and assembles a document from the
    /// events of this call. Events already returned by
    /// [`update`](Self::update) are not repeated.
    pub fn parse(mut self, input: &str) -> Document {
        let mut events = self.update(input);
        events.extend(self.flush());
        self.assembler.into_document(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Role;
    use crate::normalize::OsFamily;

    #[test]
    fn test_crlf_is_stripped() {
        let doc = parse_document(["Heap:\r", " PSYoungGen      total 1024K, used 512K\r"]);
        assert_eq!(doc.events[0].kind, EventKind::Heap);
        assert_eq!(doc.events[0].role, Role::Header);
        assert_eq!(doc.events[1].kind, EventKind::Heap);
        assert_eq!(doc.events[1].text, " PSYoungGen      total 1024K, used 512K");
    }

    #[test]
    fn test_indices_follow_input() {
        let doc = parse_document(["", "???", "#"]);
        let indices: Vec<usize> = doc.events.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let input = "Heap:\n PSYoungGen      total 1024K, used 512K\n\nPolling page: 0x00007f3a4d6e4000\n";
        let one_shot = parse_document(input.lines());

        let mut parser = CrashLogParser::new();
        let mut events = Vec::new();
        for chunk in input.as_bytes().chunks(7) {
            events.extend(parser.update(std::str::from_utf8(chunk).unwrap()));
        }
        events.extend(parser.finish());
        assert_eq!(events, one_shot.events);
    }

    #[test]
    fn test_unterminated_tail_is_flushed() {
        let mut parser = CrashLogParser::new();
        assert!(parser.update("Polling page: 0x00007f3a4d6e4000").is_empty());
        let tail = parser.finish();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].kind, EventKind::PollingPage);
    }

    #[test]
    fn test_os_and_arch_gathered() {
        let doc = parse_document([
            "# Java VM: OpenJDK 64-Bit Server VM (17.0.8+7, mixed mode, sharing, tiered, compressed oops, compressed class ptrs, g1 gc, linux-amd64)",
            "uname: Linux 5.15.0-86-generic #96-Ubuntu SMP Wed Sep 20 08:23:49 UTC 2023 x86_64",
        ]);
        assert_eq!(doc.arch, Some(Arch::X86_64));
        let os = doc.os.expect("os");
        assert_eq!(os.family, OsFamily::Linux);
    }
}
