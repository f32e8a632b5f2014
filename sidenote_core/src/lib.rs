//! `sidenote_core` is the extraction engine behind sidenote: it scans a
//! source-code file for a lightweight annotation syntax embedded in line
//! comments, strips the markers out of the code that will be displayed, and
//! returns structured annotation records whose anchors index directly into
//! the cleaned code.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Raw source text
//!   → Line tokenizer (physical lines, terminators preserved per line)
//!   → Marker recognizer (classifies lines: plain / open / close / single / body)
//!   → Assembler (explicit stack; pairs opens with closes, collects note bodies)
//!   → Reconstructor (drops marker lines, translates anchors into displayed
//!     coordinates)
//!   → ExtractionResult { code, annotations }
//! ```
//!
//! ## Marker Syntax
//!
//! Annotations live in line comments (`//` by default, configurable via
//! [`MarkerSyntax`]):
//!
//! ```cpp
//! int ledPin = 13; // note: the built-in LED on most boards
//!
//! // note-start
//! // Debounce the button so a single press
//! // registers exactly once.
//! if (millis() - lastPress > DEBOUNCE_MS) {
//!   handlePress();
//! }
//! // note-end
//! ```
//!
//! `note:` attaches a one-line note, either trailing the code it explains or
//! on its own line (attaching to the next line of code). `note-start` /
//! `note-end` wrap a range; an optional `(id)` on both markers pairs them
//! explicitly, which allows overlapping ranges that plain nesting cannot
//! express. Comment lines inside an open range become the note body.
//!
//! ## Key Types
//!
//! - [`ExtractionResult`] — the cleaned code plus its [`Annotation`] list.
//! - [`MarkerSyntax`] — the comment prefixes the recognizer matches.
//! - [`SidenoteError`] — authoring defects (unterminated annotation,
//!   mismatched close, malformed marker) reported fail-fast, one per call.
//!
//! The engine is a pure function over an in-memory string: no I/O, no shared
//! state, deterministic output, safe to fan out across files. The
//! [`project`] module is the content-loader boundary: it enumerates project
//! directories, loads metadata and source files, and runs extraction per
//! file with per-file failure isolation.

pub use config::*;
pub use engine::*;
pub use error::*;
pub use project::*;

pub mod config;
mod engine;
mod error;
pub(crate) mod lexer;
pub(crate) mod parser;
pub mod project;
pub(crate) mod tokens;

#[cfg(test)]
mod __fixtures;
