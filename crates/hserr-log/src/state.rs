use serde::{Deserialize, Serialize};

use crate::ir::{Event, Role, Value};
use crate::kind::EventKind;

/// The section currently accepting continuation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSection {
    pub kind: EventKind,
    /// Flat `{`/`}` balance for brace-tracked sections.
    pub depth: u32,
    /// Count announced by the header (`(250 events)`). Informational.
    pub declared: Option<u64>,
    /// Body rows seen so far. Informational.
    pub seen: u64,
}

impl OpenSection {
    fn new(kind: EventKind, declared: Option<u64>) -> Self {
        Self {
            kind,
            depth: 0,
            declared,
            seen: 0,
        }
    }
}

/// Context carried from one line to the next.
///
/// A plain value: [`SectionState::advance`] returns the successor instead of
/// mutating, so any state can be constructed and fed to
/// [`classify`](crate::classify::classify) in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectionState {
    open: Option<OpenSection>,
}

impl SectionState {
    /// No section open.
    pub fn new() -> Self {
        Self { open: None }
    }

    /// A state with `kind` freshly opened, as if its header was just read.
    pub fn inside(kind: EventKind) -> Self {
        Self {
            open: Some(OpenSection::new(kind, None)),
        }
    }

    pub fn open(&self) -> Option<&OpenSection> {
        self.open.as_ref()
    }

    pub fn open_kind(&self) -> Option<EventKind> {
        self.open.map(|s| s.kind)
    }

    pub fn depth(&self) -> u32 {
        self.open.map_or(0, |s| s.depth)
    }

    /// State after `event` has been appended to the document.
    ///
    /// A truncated event ends the sub-report it interrupted: the section stays
    /// open but any unbalanced `{` it left behind is dropped.
    pub fn advance(&self, event: &Event) -> SectionState {
        if event.truncated {
            return self.unwind(event);
        }
        if event.kind == EventKind::Unknown {
            return *self;
        }
        if event.kind == EventKind::Blank {
            return self.close(event);
        }

        match self.open {
            Some(open) if open.kind == event.kind => match event.role {
                Role::Header => self.start(event),
                Role::Body | Role::Throwaway => {
                    let depth = shift_depth(open.depth, &event.text);
                    let seen = open.seen + u64::from(event.role == Role::Body);
                    SectionState {
                        open: Some(OpenSection {
                            depth,
                            seen,
                            ..open
                        }),
                    }
                }
                Role::Footer if event.text.trim() == "}" => SectionState {
                    open: Some(OpenSection {
                        depth: shift_depth(open.depth, &event.text),
                        ..open
                    }),
                },
                Role::Footer => self.close(event),
                Role::Standalone | Role::Unknown => *self,
            },
            _ => match event.role {
                Role::Header if event.kind.is_section() => self.start(event),
                _ => self.close(event),
            },
        }
    }

    fn start(&self, event: &Event) -> SectionState {
        let declared = event.field("events").and_then(Value::as_count);
        log::debug!(
            "line {}: open {} (declared {:?})",
            event.index,
            event.kind,
            declared
        );
        SectionState {
            open: Some(OpenSection::new(event.kind, declared)),
        }
    }

    fn unwind(&self, event: &Event) -> SectionState {
        match self.open {
            Some(open) if open.depth > 0 => {
                log::debug!(
                    "line {}: {} truncated at depth {}",
                    event.index,
                    open.kind,
                    open.depth
                );
                SectionState {
                    open: Some(OpenSection { depth: 0, ..open }),
                }
            }
            _ => *self,
        }
    }

    fn close(&self, event: &Event) -> SectionState {
        if let Some(open) = self.open {
            log::debug!(
                "line {}: close {} after {} rows",
                event.index,
                open.kind,
                open.seen
            );
        }
        SectionState { open: None }
    }
}

fn shift_depth(depth: u32, text: &str) -> u32 {
    let opens = text.matches('{').count() as u32;
    let closes = text.matches('}').count() as u32;
    (depth + opens).saturating_sub(closes)
}
