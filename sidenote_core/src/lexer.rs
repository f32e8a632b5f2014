use logos::Logos;

use crate::SidenoteError;
use crate::SidenoteResult;
use crate::config::MarkerSyntax;
use crate::tokens::LineEnding;
use crate::tokens::MarkerKind;
use crate::tokens::SourceLine;

/// Split raw source text into physical lines.
///
/// Lines end at `\n`, tolerating a trailing `\r`; the terminator is recorded
/// on the line rather than kept in its text. The line count is the number of
/// terminators, plus one if the text is non-empty and does not end with a
/// terminator. Total function: empty input gives an empty sequence, a lone
/// terminator gives one empty line.
pub(crate) fn tokenize(source: &str) -> Vec<SourceLine<'_>> {
	let mut lines = Vec::new();
	let mut start = 0;
	let mut index = 0;

	for (at, _) in source.match_indices('\n') {
		let (end, terminator) = if at > start && source.as_bytes()[at - 1] == b'\r' {
			(at - 1, LineEnding::CrLf)
		} else {
			(at, LineEnding::Lf)
		};
		let text = &source[start..end];
		lines.push(SourceLine {
			index,
			text,
			indent: indent_len(text),
			terminator: Some(terminator),
		});
		index += 1;
		start = at + 1;
	}

	if start < source.len() {
		let text = &source[start..];
		lines.push(SourceLine {
			index,
			text,
			indent: indent_len(text),
			terminator: None,
		});
	}

	lines
}

/// Byte length of the leading space/tab run.
pub(crate) fn indent_len(text: &str) -> usize {
	text.len() - text.trim_start_matches([' ', '\t']).len()
}

/// Raw tokens for marker headers, lexed from the content of a line comment.
///
/// The sentinels are explicit tokens and identifiers are a regex, so logos
/// resolves `note-start` to the sentinel but `note-starter` to a plain
/// identifier (longest match wins, explicit tokens win ties).
#[derive(Logos, Debug, PartialEq)]
enum HeaderToken {
	#[token("note:")]
	SingleSentinel,
	#[token("note-start")]
	OpenSentinel,
	#[token("note-end")]
	CloseSentinel,
	#[token("(")]
	ParenOpen,
	#[token(")")]
	ParenClose,
	#[regex(r"[ \t]+")]
	Whitespace,
	#[regex(r"[A-Za-z_][A-Za-z0-9_-]*")]
	Ident,
}

/// A recognized marker header, before line context is applied.
enum Header<'a> {
	/// Not a marker at all; an ordinary comment.
	None,
	/// `note: text`
	Single { text: &'a str },
	/// `note-start(id) seed`
	Open { id: Option<&'a str>, seed: &'a str },
	/// `note-end(id)`
	Close { id: Option<&'a str> },
}

/// Classifies physical lines against the marker syntax.
///
/// Classification is context-free except for one rule from the assembler: an
/// ordinary comment is body text while at least one annotation is open, and
/// plain code otherwise. That context arrives as the `depth` parameter rather
/// than as recognizer state, keeping the whole pipeline re-entrant.
pub(crate) struct Recognizer<'s> {
	syntax: &'s MarkerSyntax,
	/// Display name of the file, for error messages only.
	file: &'s str,
}

impl<'s> Recognizer<'s> {
	pub fn new(syntax: &'s MarkerSyntax, file: &'s str) -> Self {
		Self { syntax, file }
	}

	/// Classify a single line. `depth` is the number of currently open
	/// annotations.
	pub fn classify<'a>(
		&self,
		line: &SourceLine<'a>,
		depth: usize,
	) -> SidenoteResult<MarkerKind<'a>> {
		let trimmed = line.trimmed();

		for prefix in &self.syntax.comment_prefixes {
			if prefix.is_empty() {
				continue;
			}
			let Some(content) = trimmed.strip_prefix(prefix.as_str()) else {
				continue;
			};

			return match self.parse_header(content.trim_start(), line)? {
				Header::Single { text } => Ok(MarkerKind::Single { text, code: None }),
				Header::Open { id, seed } => Ok(MarkerKind::Open { id, seed }),
				Header::Close { id } => Ok(MarkerKind::Close { id }),
				Header::None => {
					if depth > 0 {
						Ok(MarkerKind::Body { text: content })
					} else {
						Ok(MarkerKind::Plain)
					}
				}
			};
		}

		self.classify_trailing(line)
	}

	/// Look for a marker trailing code on the same line. Only the single-line
	/// `note:` form is legal there; a block sentinel after code is an
	/// authoring mistake. The scan is left-to-right, first hit wins.
	fn classify_trailing<'a>(&self, line: &SourceLine<'a>) -> SidenoteResult<MarkerKind<'a>> {
		for prefix in &self.syntax.comment_prefixes {
			if prefix.is_empty() {
				continue;
			}
			let mut from = 0;
			while let Some(found) = line.text[from..].find(prefix.as_str()) {
				let at = from + found;
				let content = line.text[at + prefix.len()..].trim_start();

				match self.parse_header(content, line)? {
					Header::Single { text } => {
						let code = line.text[..at].trim_end();
						return Ok(MarkerKind::Single {
							text,
							code: Some(code),
						});
					}
					Header::Open { .. } | Header::Close { .. } => {
						return Err(self.malformed(line, "block markers must occupy their own line"));
					}
					Header::None => {}
				}

				from = at + prefix.len();
			}
		}

		Ok(MarkerKind::Plain)
	}

	/// Parse the content of a comment into a marker header. Content that does
	/// not begin with a sentinel is `Header::None`; content that begins with
	/// a sentinel but fails to parse its payload is an error.
	fn parse_header<'a>(
		&self,
		content: &'a str,
		line: &SourceLine<'_>,
	) -> SidenoteResult<Header<'a>> {
		let mut lexer = HeaderToken::lexer(content);

		match lexer.next() {
			Some(Ok(HeaderToken::SingleSentinel)) => {
				let text = lexer.remainder().trim();
				if text.is_empty() {
					return Err(self.malformed(line, "single-line annotation `note:` has no note text"));
				}
				Ok(Header::Single { text })
			}
			Some(Ok(HeaderToken::OpenSentinel)) => {
				let id = self.parse_id(&mut lexer, line)?;
				let rest = lexer.remainder();
				if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
					return Err(self.malformed(line, "unexpected text directly after `note-start`"));
				}
				Ok(Header::Open {
					id,
					seed: rest.trim(),
				})
			}
			Some(Ok(HeaderToken::CloseSentinel)) => {
				let id = self.parse_id(&mut lexer, line)?;
				if !lexer.remainder().trim().is_empty() {
					return Err(self.malformed(line, "`note-end` does not take a trailing note"));
				}
				Ok(Header::Close { id })
			}
			_ => Ok(Header::None),
		}
	}

	/// Parse an optional `(id)` hugging the sentinel it follows.
	fn parse_id<'a>(
		&self,
		lexer: &mut logos::Lexer<'a, HeaderToken>,
		line: &SourceLine<'_>,
	) -> SidenoteResult<Option<&'a str>> {
		if !lexer.remainder().starts_with('(') {
			return Ok(None);
		}

		// Consume `(`.
		let _ = lexer.next();

		let id = match lexer.next() {
			Some(Ok(HeaderToken::Ident)) => lexer.slice(),
			_ => {
				return Err(self.malformed(line, "annotation id must match [A-Za-z_][A-Za-z0-9_-]*"));
			}
		};

		match lexer.next() {
			Some(Ok(HeaderToken::ParenClose)) => Ok(Some(id)),
			_ => Err(self.malformed(line, "annotation id is missing its closing `)`")),
		}
	}

	fn malformed(&self, line: &SourceLine<'_>, reason: impl Into<String>) -> SidenoteError {
		SidenoteError::MalformedMarkerSyntax {
			file: self.file.to_string(),
			line: line.index + 1,
			reason: reason.into(),
		}
	}
}
