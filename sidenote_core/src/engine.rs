use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::SidenoteResult;
use crate::config::MarkerSyntax;
use crate::lexer::Recognizer;
use crate::lexer::tokenize;
use crate::parser::Assembler;
use crate::parser::RawAnchor;
use crate::tokens::MarkerKind;

/// A structured note attached to a line range of the displayed code.
///
/// Line numbers index directly into the code returned alongside the
/// annotation — marker and body lines are already gone — so the rendering
/// layer can overlay callouts without any further translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
	/// 0-based first line of the anchor range in the displayed code.
	pub start_line: usize,
	/// 0-based last line of the anchor range, inclusive. Never less than
	/// `start_line`.
	pub end_line: usize,
	/// The note text. Body lines keep their internal line breaks.
	pub text: String,
	/// For a note that trailed code on its own line: the byte offset into
	/// the displayed line just past the code the note attaches to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub anchor_column: Option<usize>,
}

/// The product of extraction: the annotation-free code plus the notes that
/// were carved out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
	/// The displayed code. Identical to the input with every marker and body
	/// line removed (each taking its own terminator with it) and no other
	/// byte altered.
	pub code: String,
	/// Annotations in the order they closed — document order of the opening
	/// marker for well-formed nested input.
	pub annotations: Vec<Annotation>,
}

/// Extract annotations from `source` using the default marker syntax.
///
/// `file_name` appears in error messages only; it never affects parsing.
pub fn extract_annotations(source: &str, file_name: &str) -> SidenoteResult<ExtractionResult> {
	extract_annotations_with_syntax(source, file_name, &MarkerSyntax::default())
}

/// Extract annotations with an explicit [`MarkerSyntax`].
///
/// A pure function: equal inputs produce byte-identical results, nothing
/// outside the call stack is read or written, and concurrent calls on
/// different files never interfere. Fails fast on the first authoring defect
/// (unterminated annotation, mismatched close, malformed marker).
pub fn extract_annotations_with_syntax(
	source: &str,
	file_name: &str,
	syntax: &MarkerSyntax,
) -> SidenoteResult<ExtractionResult> {
	let lines = tokenize(source);
	let recognizer = Recognizer::new(syntax, file_name);
	let mut assembler = Assembler::new(file_name);

	// Displayed text per retained line, plus the old-index → new-index map
	// the anchor translation below runs through.
	let mut kept: Vec<(usize, &str)> = Vec::new();
	let mut new_index: Vec<Option<usize>> = vec![None; lines.len()];

	for line in &lines {
		let kind = recognizer.classify(line, assembler.depth())?;

		match kind {
			MarkerKind::Plain => {
				new_index[line.index] = Some(kept.len());
				kept.push((line.index, line.text));
			}
			MarkerKind::Single {
				code: Some(code), ..
			} => {
				// Trailing form: the host line survives minus the marker span.
				new_index[line.index] = Some(kept.len());
				kept.push((line.index, code));
			}
			_ => {}
		}

		assembler.step(line, kind)?;
	}

	let raw = assembler.finish()?;
	debug!(
		file = file_name,
		lines = lines.len(),
		kept = kept.len(),
		annotations = raw.len(),
		"extraction complete"
	);

	// Every retained line keeps its own original terminator, so removing a
	// marker line removes exactly that line's text and terminator.
	let mut code = String::with_capacity(source.len());
	for &(old, text) in &kept {
		code.push_str(text);
		if let Some(terminator) = lines[old].terminator {
			code.push_str(terminator.as_str());
		}
	}

	// next_kept[i] / prev_kept[i]: (old index, new index) of the retained
	// line nearest to original line i, looking forward / backward.
	let mut next_kept: Vec<Option<(usize, usize)>> = vec![None; lines.len() + 1];
	let mut next = None;
	for at in (0..lines.len()).rev() {
		if let Some(new) = new_index[at] {
			next = Some((at, new));
		}
		next_kept[at] = next;
	}
	let mut prev_kept: Vec<Option<(usize, usize)>> = vec![None; lines.len()];
	let mut prev = None;
	for (at, new) in new_index.iter().enumerate() {
		if let Some(new) = new {
			prev = Some((at, *new));
		}
		prev_kept[at] = prev;
	}

	let mut annotations = Vec::with_capacity(raw.len());
	for annotation in raw {
		match annotation.anchor {
			RawAnchor::HostLine { line, column } => {
				// The host line is retained by construction.
				let Some(at) = new_index[line] else { continue };
				annotations.push(Annotation {
					start_line: at,
					end_line: at,
					text: annotation.text,
					anchor_column: Some(column),
				});
			}
			RawAnchor::Following { line } => match next_kept[line + 1] {
				Some((_, at)) => {
					annotations.push(Annotation {
						start_line: at,
						end_line: at,
						text: annotation.text,
						anchor_column: None,
					});
				}
				None => {
					warn!(
						file = file_name,
						line = line + 1,
						"annotation has no displayed line to attach to; dropping"
					);
				}
			},
			RawAnchor::Enclosed {
				open_line,
				close_line,
			} => {
				let inside = next_kept[open_line + 1].filter(|&(old, _)| old < close_line);
				match inside {
					Some((_, start)) => {
						// A retained line inside the block guarantees one at
						// or before the close marker.
						let Some((_, end)) = prev_kept[close_line - 1] else {
							continue;
						};
						annotations.push(Annotation {
							start_line: start,
							end_line: end,
							text: annotation.text,
							anchor_column: None,
						});
					}
					None => match next_kept[close_line + 1] {
						// Degenerate block: no displayed line between the
						// markers. Attach to the next displayed line, or drop
						// when the file ends first.
						Some((_, at)) => {
							warn!(
								file = file_name,
								line = open_line + 1,
								"annotation encloses no displayed code; attaching to the next line"
							);
							annotations.push(Annotation {
								start_line: at,
								end_line: at,
								text: annotation.text,
								anchor_column: None,
							});
						}
						None => {
							warn!(
								file = file_name,
								line = open_line + 1,
								"annotation encloses no displayed code and none follows; dropping"
							);
						}
					},
				}
			}
		}
	}

	Ok(ExtractionResult { code, annotations })
}
