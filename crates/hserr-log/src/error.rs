use thiserror::Error;

use crate::kind::EventKind;

/// Failure to read a value out of its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("unrecognized byte size `{0}`")]
    ByteSize(String),
    #[error("invalid hex address `{0}`")]
    HexAddress(String),
    #[error("unrecognized limit value `{0}`")]
    Limit(String),
}

/// A line accepted by the classifier for `kind` that the paired builder
/// could not read.
///
/// This is always an implementation bug: classification and extraction share
/// their grammars, so a defect means the two drifted apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarDefect {
    #[error("`{kind}` builder rejected line {line:?}")]
    Rejected { kind: EventKind, line: String },
}

impl GrammarDefect {
    pub(crate) fn rejected(kind: EventKind, line: &str) -> Self {
        Self::Rejected {
            kind,
            line: line.to_string(),
        }
    }
}
