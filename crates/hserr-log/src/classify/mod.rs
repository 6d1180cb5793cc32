//! Line classification.
//!
//! [`classify`] decides the kind of one line given the section open before
//! it. The decision is a fixed cascade, first hit wins:
//!
//! 1. the open section's continuation grammar
//! 2. the mid-report error sentinel (attributed to the open section)
//! 3. [`HEADER_TABLE`], in declared order
//! 4. absorption by free-text sections
//! 5. [`EventKind::Blank`]
//! 6. [`EventKind::Unknown`]

mod continuation;
mod headers;

pub use headers::{HEADER_TABLE, HeaderRule};
pub(crate) use headers::is_header;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::kind::EventKind;
use crate::state::SectionState;

/// `[error occurred during error reporting (printing memory info), id 0xb]`,
/// optionally followed by details of the secondary fault before the `]`.
pub(crate) static SENTINEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*\[error occurred during error reporting \((?P<step>.*?)\), id (?P<id>0x[0-9a-fA-F]+|\d+)(?:,\s*(?P<detail>.*?))?\]\s*$",
    )
    .unwrap()
});

pub fn is_sentinel(line: &str) -> bool {
    SENTINEL.is_match(line)
}

/// Classifies `line` in the context of `state`. Total: every input yields a
/// kind.
pub fn classify(line: &str, state: &SectionState) -> EventKind {
    let kind = cascade(line, state);
    log::trace!("{:?} -> {}", line, kind);
    kind
}

fn cascade(line: &str, state: &SectionState) -> EventKind {
    let open = state.open();

    if let Some(open) = open
        && continuation::continues(open, line)
    {
        return open.kind;
    }

    if is_sentinel(line) {
        return open.map_or(EventKind::ReportAborted, |o| o.kind);
    }

    if let Some(kind) = headers::first_match(line) {
        return kind;
    }

    if let Some(open) = open
        && open.kind.traits().absorbs
    {
        return open.kind;
    }

    if line.trim().is_empty() {
        return EventKind::Blank;
    }

    EventKind::Unknown
}

/// Every header-table kind `line` matches, in table order. `classify` picks
/// the first one when no section claims the line.
pub fn matching_kinds(line: &str) -> Vec<EventKind> {
    headers::all_matches(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_declared_row_wins() {
        let line = "#  SIGSEGV (0xb) at pc=0x00007f3a4c2d1e2b, pid=12345, tid=12346";
        assert_eq!(
            matching_kinds(line),
            vec![EventKind::CrashSignal, EventKind::HeaderComment]
        );
        assert_eq!(classify(line, &SectionState::new()), EventKind::CrashSignal);
    }

    #[test]
    fn test_cpu_model_is_not_cpu() {
        let line = "CPU Model and flags from /proc/cpuinfo:";
        assert_eq!(matching_kinds(line), vec![EventKind::CpuModel]);
        assert_eq!(classify("CPU: total 4 (initial active 4)", &SectionState::new()), EventKind::Cpu);
    }

    #[test]
    fn test_sentinel_without_section() {
        let line = "[error occurred during error reporting (printing native stack), id 0xb]";
        assert_eq!(classify(line, &SectionState::new()), EventKind::ReportAborted);
    }

    #[test]
    fn test_sentinel_with_detail() {
        assert!(is_sentinel(
            "[error occurred during error reporting (printing register info), id 0xb, SIGSEGV (0xb) at pc=0x00007f3a4c2d1e2b]"
        ));
        assert!(!is_sentinel("[Global flags]"));
    }

    #[test]
    fn test_absorption_and_fallbacks() {
        let inside = SectionState::inside(EventKind::RegisterToMemoryMapping);
        assert_eq!(
            classify(" - klass: 'java/lang/String'", &inside),
            EventKind::RegisterToMemoryMapping
        );
        assert_eq!(classify(" - klass: 'java/lang/String'", &SectionState::new()), EventKind::Unknown);
        assert_eq!(classify("   ", &SectionState::new()), EventKind::Blank);
    }

    #[test]
    fn test_header_beats_absorption() {
        let inside = SectionState::inside(EventKind::Metaspace);
        let line = "CodeHeap 'non-nmethods': size=5700Kb used=1234Kb max_used=1250Kb free=4465Kb";
        assert_eq!(classify(line, &inside), EventKind::CodeCache);
    }
}
