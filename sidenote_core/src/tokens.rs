/// The terminator that ended a physical line in the original file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
	/// `\n`
	Lf,
	/// `\r\n`
	CrLf,
}

impl LineEnding {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Lf => "\n",
			Self::CrLf => "\r\n",
		}
	}
}

/// One physical line of the original source file.
///
/// Produced by [`tokenize`](crate::lexer::tokenize) and consumed read-only by
/// the recognizer and assembler. The terminator is kept out of [`text`] so the
/// reconstructor can splice lines back together byte-for-byte.
///
/// [`text`]: SourceLine::text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
	/// 0-based position in the original file.
	pub index: usize,
	/// The line's text, without its terminator.
	pub text: &'a str,
	/// Byte length of the leading whitespace run.
	pub indent: usize,
	/// The terminator that followed this line. `None` only for a final line
	/// that ran into end-of-file.
	pub terminator: Option<LineEnding>,
}

impl<'a> SourceLine<'a> {
	/// The line's text with leading whitespace removed.
	pub fn trimmed(&self) -> &'a str {
		&self.text[self.indent..]
	}
}

/// Classification of a single physical line, with the payload extracted from
/// its marker when one is present.
///
/// A line carries at most one classification. Block markers (`Open`/`Close`)
/// must occupy their own line; the single-line form is the one exception and
/// may trail code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind<'a> {
	/// Ordinary code (or an ordinary comment outside any annotation).
	/// Retained verbatim in the reconstructed output.
	Plain,
	/// `// note-start` or `// note-start(id) seed text`
	Open {
		/// Explicit identifier used to pair a later close marker.
		id: Option<&'a str>,
		/// Note text carried on the open marker line itself.
		seed: &'a str,
	},
	/// `// note-end` or `// note-end(id)`
	Close { id: Option<&'a str> },
	/// `// note: text` — an implicit open+close on a single line.
	Single {
		/// The note text after the sentinel.
		text: &'a str,
		/// The retained code span when the marker trailed code on the same
		/// line. `None` for the full-line form.
		code: Option<&'a str>,
	},
	/// A comment line swallowed into the body of the innermost open
	/// annotation.
	Body { text: &'a str },
}
