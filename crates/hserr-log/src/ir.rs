use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::EventKind;
use crate::normalize::{
    Arch, ByteSize, Device, HexAddress, Limit, OsFingerprint, SignalDescriptor,
};

/// Where a line sits relative to the section it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Header,
    Body,
    Footer,
    Standalone,
    /// Recognized but carries nothing worth analysing (`#` padding, blank
    /// lines inside a register dump, ...).
    Throwaway,
    Unknown,
}

impl Role {
    /// Stable kebab-case name; identical to the serde representation.
    pub fn slug(self) -> &'static str {
        match self {
            Role::Header => "header",
            Role::Body => "body",
            Role::Footer => "footer",
            Role::Standalone => "standalone",
            Role::Throwaway => "throwaway",
            Role::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// One classified line of a crash log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Zero-based line number in the source document.
    pub index: usize,
    pub kind: EventKind,
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    /// Set when the crashing process gave up on the enclosing sub-report.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl Event {
    /// Returns the same event placed at `index`.
    pub fn with_index(self, index: usize) -> Self {
        Self { index, ..self }
    }

    /// First field named `name`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn is_throwaway(&self) -> bool {
        self.role == Role::Throwaway
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == EventKind::Unknown
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A typed field value.
///
/// [`Value::Absent`] marks a field the line's grammar has room for but the
/// line left out; it is never the same as an empty [`Value::Text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Value {
    Size(ByteSize),
    Count(u64),
    Integer(i64),
    Decimal(f64),
    Text(String),
    Address(HexAddress),
    /// Ordered bounds, arity fixed per kind.
    Range(Vec<HexAddress>),
    Signal(SignalDescriptor),
    Os(OsFingerprint),
    Arch(Arch),
    Frame(StackFrame),
    Marker(FrameMarker),
    Device(Device),
    Flag(bool),
    Limit(Limit),
    List(Vec<String>),
    Absent,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Trimmed `Text` for a value whose label is on the line. An empty value
    /// stays `Text("")`, distinct from [`Value::Absent`].
    pub fn text_present(s: &str) -> Self {
        Value::Text(s.trim().to_string())
    }

    /// `Text` for a non-empty trimmed string, `Absent` otherwise.
    pub fn text_or_absent(s: Option<&str>) -> Self {
        match s.map(str::trim) {
            Some(t) if !t.is_empty() => Value::Text(t.to_string()),
            _ => Value::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_size(&self) -> Option<ByteSize> {
        match self {
            Value::Size(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            Value::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<HexAddress> {
        match self {
            Value::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&[HexAddress]> {
        match self {
            Value::Range(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_signal(&self) -> Option<&SignalDescriptor> {
        match self {
            Value::Signal(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&StackFrame> {
        match self {
            Value::Frame(f) => Some(f),
            _ => None,
        }
    }
}

/// Who produced a stack frame, from the one-letter column of frame rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameTag {
    /// `J` (JIT) or `A` (AOT) compiled Java code.
    Compiled,
    /// `j`
    Interpreted,
    /// `V`
    Vm,
    /// `v`, stubs and other generated code.
    VmGenerated,
    /// `C`
    Native,
}

impl FrameTag {
    pub fn from_column(c: char) -> Option<FrameTag> {
        match c {
            'J' | 'A' => Some(FrameTag::Compiled),
            'j' => Some(FrameTag::Interpreted),
            'V' => Some(FrameTag::Vm),
            'v' => Some(FrameTag::VmGenerated),
            'C' => Some(FrameTag::Native),
            _ => None,
        }
    }
}

/// Structural rows inside a frame list that are not frames themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameMarker {
    /// `...<more frames>...`
    Elided,
    ThreadBeingProcessed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub tag: FrameTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<HexAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Code address for compiled frames (`@ 0x...`) and bare native pcs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<HexAddress>,
}

/// The classified contents of one crash log, plus facts gathered while
/// reading it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub events: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<OsFingerprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<Arch>,
}

impl Document {
    /// Events of one kind, in document order.
    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// The descriptor of the signal that killed the process: the `siginfo`
    /// row when present, else the banner.
    pub fn signal(&self) -> Option<&SignalDescriptor> {
        self.events_of(EventKind::Siginfo)
            .chain(self.events_of(EventKind::CrashSignal))
            .find_map(|e| e.field("signal").and_then(Value::as_signal))
    }
}
