use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SidenoteError {
	#[error(transparent)]
	#[diagnostic(code(sidenote::io_error))]
	Io(#[from] std::io::Error),

	#[error("unterminated annotation in `{file}`: the `note-start` at line {line} has no matching `note-end`")]
	#[diagnostic(
		code(sidenote::unterminated_annotation),
		help("close every `note-start` with a `note-end` marker before the end of the file")
	)]
	UnterminatedAnnotation { file: String, line: usize },

	#[error("close marker at `{file}:{line}` does not match any open annotation")]
	#[diagnostic(
		code(sidenote::mismatched_close),
		help("a `note-end(id)` must name a still-open `note-start(id)`, and a bare `note-end` needs at least one open annotation")
	)]
	MismatchedClose {
		file: String,
		line: usize,
		/// The identifier carried by the offending close marker, if any.
		id: Option<String>,
	},

	#[error("malformed annotation marker at `{file}:{line}`: {reason}")]
	#[diagnostic(
		code(sidenote::malformed_marker),
		help("markers are `note: text`, `note-start(id)`, and `note-end(id)`; block markers must occupy their own line")
	)]
	MalformedMarkerSyntax {
		file: String,
		line: usize,
		reason: String,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(sidenote::config_parse),
		help("check that sidenote.toml is valid TOML with [content] and/or [syntax] sections")
	)]
	ConfigParse(String),

	#[error("no project named `{id}` under `{root}`")]
	#[diagnostic(
		code(sidenote::missing_project),
		help("each project is a directory containing a project.json file")
	)]
	MissingProject { id: String, root: String },

	#[error("failed to load project metadata from `{path}`: {reason}")]
	#[diagnostic(code(sidenote::project_metadata))]
	ProjectMetadata { path: String, reason: String },

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(sidenote::file_too_large),
		help("raise max_file_size in sidenote.toml or drop the file from the include patterns")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },
}

pub type SidenoteResult<T> = Result<T, SidenoteError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
