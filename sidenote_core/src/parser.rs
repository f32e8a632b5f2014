use crate::SidenoteError;
use crate::SidenoteResult;
use crate::lexer::indent_len;
use crate::tokens::MarkerKind;
use crate::tokens::SourceLine;

/// A draft annotation held on the assembler stack while its block is open.
#[derive(Debug)]
struct AnnotationDraft<'a> {
	/// Pairing id from `note-start(id)`, if present.
	id: Option<&'a str>,
	/// 0-based original line of the open marker.
	open_line: usize,
	/// Note text carried on the open marker line itself.
	seed: &'a str,
	/// Raw body lines, indentation intact.
	body: Vec<&'a str>,
}

/// Where a finished annotation anchors, in original-file coordinates.
///
/// The engine translates these into reconstructed coordinates once the
/// retained-line mapping is known; the assembler itself never finalizes line
/// numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawAnchor {
	/// Block form: anchors to the retained lines strictly between the open
	/// and close marker lines.
	Enclosed { open_line: usize, close_line: usize },
	/// Trailing single-line form: anchors to its own (retained) host line.
	/// `column` is the byte offset just past the retained code.
	HostLine { line: usize, column: usize },
	/// Full-line single form: anchors to the next retained line.
	Following { line: usize },
}

/// A finished annotation in original coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawAnnotation {
	pub text: String,
	pub anchor: RawAnchor,
}

/// The annotation assembler: an explicit stack machine over classified lines.
///
/// An open marker pushes a draft, body text accumulates on the innermost
/// draft, and a close pops either the top of the stack (bare `note-end`) or
/// the matching draft wherever it sits (`note-end(id)`) — the id form is what
/// permits overlapping, non-nested ranges. The finished list is ordered by
/// close, which for well-formed nested input matches the document order of
/// the opening markers.
pub(crate) struct Assembler<'a> {
	/// Display name of the file, for error messages only.
	file: &'a str,
	stack: Vec<AnnotationDraft<'a>>,
	finished: Vec<RawAnnotation>,
}

impl<'a> Assembler<'a> {
	pub fn new(file: &'a str) -> Self {
		Self {
			file,
			stack: Vec::new(),
			finished: Vec::new(),
		}
	}

	/// Number of currently open annotations.
	pub fn depth(&self) -> usize {
		self.stack.len()
	}

	/// Feed one classified line through the state machine.
	pub fn step(&mut self, line: &SourceLine<'a>, kind: MarkerKind<'a>) -> SidenoteResult<()> {
		match kind {
			MarkerKind::Plain => {}
			MarkerKind::Open { id, seed } => {
				self.stack.push(AnnotationDraft {
					id,
					open_line: line.index,
					seed,
					body: Vec::new(),
				});
			}
			MarkerKind::Body { text } => {
				// The recognizer only yields body text while a draft is open.
				if let Some(top) = self.stack.last_mut() {
					top.body.push(text);
				}
			}
			MarkerKind::Close { id } => self.close(line, id)?,
			MarkerKind::Single { text, code } => {
				// An atomic open+close; never touches the stack.
				let anchor = match code {
					Some(code) => RawAnchor::HostLine {
						line: line.index,
						column: code.len(),
					},
					None => RawAnchor::Following { line: line.index },
				};
				self.finished.push(RawAnnotation {
					text: text.to_string(),
					anchor,
				});
			}
		}

		Ok(())
	}

	fn close(&mut self, line: &SourceLine<'a>, id: Option<&'a str>) -> SidenoteResult<()> {
		let draft = match id {
			None => self.stack.pop(),
			Some(id) => {
				let at = self.stack.iter().rposition(|draft| draft.id == Some(id));
				at.map(|at| self.stack.remove(at))
			}
		};

		let Some(draft) = draft else {
			return Err(SidenoteError::MismatchedClose {
				file: self.file.to_string(),
				line: line.index + 1,
				id: id.map(Into::into),
			});
		};

		self.finished.push(RawAnnotation {
			text: assemble_text(draft.seed, &draft.body),
			anchor: RawAnchor::Enclosed {
				open_line: draft.open_line,
				close_line: line.index,
			},
		});

		Ok(())
	}

	/// Finish the stream. Any draft still open is an authoring error; the
	/// first (outermost) unmatched open is the one reported.
	pub fn finish(self) -> SidenoteResult<Vec<RawAnnotation>> {
		if let Some(draft) = self.stack.first() {
			return Err(SidenoteError::UnterminatedAnnotation {
				file: self.file.to_string(),
				line: draft.open_line + 1,
			});
		}

		Ok(self.finished)
	}
}

/// Join the seed and body lines into the final note text. Blank body lines
/// at either edge are dropped, and the common leading indentation of the
/// remaining body lines is stripped while internal line breaks survive.
fn assemble_text(seed: &str, body: &[&str]) -> String {
	let mut body = body;
	while body.first().is_some_and(|line| line.trim().is_empty()) {
		body = &body[1..];
	}
	while body.last().is_some_and(|line| line.trim().is_empty()) {
		body = &body[..body.len() - 1];
	}

	let common = body
		.iter()
		.filter(|line| !line.trim().is_empty())
		.map(|line| indent_len(line))
		.min()
		.unwrap_or(0);

	let mut parts: Vec<&str> = Vec::with_capacity(body.len() + 1);
	if !seed.is_empty() {
		parts.push(seed);
	}
	for line in body {
		if line.trim().is_empty() {
			parts.push("");
		} else {
			parts.push(&line[common..]);
		}
	}

	parts.join("\n")
}
