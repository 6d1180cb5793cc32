//! # hserr Log Classifier
//!
//! Line classifier and field extractor for JVM fatal error logs
//! (`hs_err_pid<N>.log`).
//!
//! ## Overview
//!
//! A crash log is dozens of independent sub-reports concatenated without a
//! global grammar: thread lists, register dumps, memory maps, event logs,
//! the OS fingerprint, and so on. Many of its lines mean nothing outside the
//! section that encloses them. This crate turns the log into an ordered
//! [`Document`] of typed [`Event`]s, one per input line:
//!
//! - **Context-sensitive classification**: a line is read against the
//!   section open before it ([`SectionState`])
//! - **Typed extraction**: sizes, addresses, signals, stack frames, OS and
//!   architecture are normalized as they are read
//! - **Totality**: unrecognized lines become [`EventKind::Unknown`] events,
//!   never errors
//! - **Incremental updates**: [`CrashLogParser`] accepts the log in chunks
//!
//! ## Architecture
//!
//! ```text
//!   line ──► classify(line, &state) ──► EventKind
//!                                          │
//!                                          ▼
//!   state' ◄── state.advance(&event) ◄── build(kind, line) ──► Event
//! ```
//!
//! Classification and extraction share their grammars: a line the
//! classifier assigns to a kind is always readable by that kind's builder.
//! A builder that disagrees raises a [`GrammarDefect`], which
//! [`build`] logs and degrades to an `Unknown` event.
//!
//! ## Event IR
//!
//! The [`ir`] module defines the serialized schema:
//!
//! - [`Event`] - index, kind, [`Role`], raw text and ordered fields
//! - [`Value`] - typed field values, with [`Value::Absent`] for a field the
//!   line left out
//! - [`Document`] - all events plus the detected OS and architecture
//!
//! ## Schema Versioning
//!
//! The IR schema follows **semantic versioning** via [`SCHEMA_VERSION`]:
//!
//! - **MAJOR**: Breaking changes to event structure (e.g., renamed kinds)
//! - **MINOR**: New event kinds or fields (backward compatible)
//! - **PATCH**: Bug fixes to classification (no schema changes)
//!
//! ## Examples
//!
//! ### One-shot Parsing
//!
//! ```no_run
//! use std::fs;
//!
//! let log = fs::read_to_string("hs_err_pid12345.log")?;
//! let doc = hserr_log::parse_document(log.lines());
//!
//! for event in doc.events.iter().filter(|e| !e.is_throwaway()) {
//!     println!("{} {}", event.index, event.kind);
//! }
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ### Streaming Parsing
//!
//! ```
//! use hserr_log::{CrashLogParser, EventKind};
//!
//! let mut parser = CrashLogParser::new();
//! let events = parser.update("Polling page: 0x00007f3a4d6e4000\nHea");
//! assert_eq!(events[0].kind, EventKind::PollingPage);
//!
//! let events = parser.update("p:\n");
//! assert_eq!(events[0].kind, EventKind::Heap);
//!
//! assert!(parser.finish().is_empty());
//! ```
//!
//! ### Exporting to JSON
//!
//! ```no_run
//! use std::fs;
//!
//! let log = fs::read_to_string("hs_err_pid12345.log")?;
//! let doc = hserr_log::CrashLogParser::new().parse(&log);
//! fs::write("events.json", serde_json::to_string_pretty(&doc)?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Per-kind field extraction.
pub mod build;
/// Context-sensitive line classification.
pub mod classify;
/// The line loop and its streaming front end.
pub mod document;
pub mod error;
/// Typed event Intermediate Representation (IR).
pub mod ir;
pub mod kind;
/// Shared value grammars.
pub mod normalize;
/// Open-section tracking between lines.
pub mod state;


pub use build::{build, parse_signal, role_for, split_command_line, try_build};
pub use classify::{HEADER_TABLE, HeaderRule, classify, is_sentinel, matching_kinds};
pub use document::{CrashLogParser, parse_document};
pub use error::{GrammarDefect, NormalizeError};
pub use ir::{Document, Event, Field, FrameMarker, FrameTag, Role, StackFrame, Value};
pub use kind::EventKind;
pub use state::{OpenSection, SectionState};

/// Schema version for the crash log event IR.
///
/// This version follows semantic versioning:
/// - MAJOR: Breaking changes to event structure
/// - MINOR: New event kinds or fields
/// - PATCH: Bug fixes to classification
pub const SCHEMA_VERSION: &str = "1.0.0";
