use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::SidenoteError;
use crate::SidenoteResult;

/// Default maximum source file size in bytes (1 MB). Annotated sketches are
/// small; anything larger is almost certainly a binary asset caught by an
/// overly-broad include pattern.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["sidenote.toml", ".sidenote.toml", ".config/sidenote.toml"];

/// Default include patterns for project source files. The `.ino` sketch plus
/// the C/C++ translation units and headers that ship alongside it.
pub const DEFAULT_INCLUDE_PATTERNS: [&str; 4] = ["*.ino", "*.h", "*.c", "*.cpp"];

/// The comment syntax the marker recognizer matches against.
///
/// The three sentinels (`note:`, `note-start`, `note-end`) are fixed; what
/// varies between embedded languages is the line-comment prefix in front of
/// them. The recognizer tries each prefix in order, so longer prefixes should
/// come first when one is a prefix of another.
///
/// The syntax is passed explicitly into the engine on every call — there is
/// no process-wide marker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSyntax {
	/// Line-comment prefixes that may introduce a marker. Defaults to `//`.
	#[serde(default = "default_comment_prefixes")]
	pub comment_prefixes: Vec<String>,
}

impl Default for MarkerSyntax {
	fn default() -> Self {
		Self {
			comment_prefixes: default_comment_prefixes(),
		}
	}
}

fn default_comment_prefixes() -> Vec<String> {
	vec!["//".into()]
}

/// Configuration loaded from a `sidenote.toml` file.
///
/// ```toml
/// [content]
/// root = "content"
/// include = ["*.ino", "*.h"]
/// max_file_size = 262144
///
/// [syntax]
/// comment_prefixes = ["//", "#"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct SidenoteConfig {
	/// Where project directories live and which files count as source code.
	#[serde(default)]
	pub content: ContentConfig,
	/// Marker comment syntax overrides.
	#[serde(default)]
	pub syntax: MarkerSyntax,
}

/// The `[content]` section of `sidenote.toml`.
#[derive(Debug, Deserialize)]
pub struct ContentConfig {
	/// Directory containing one subdirectory per project.
	#[serde(default = "default_content_root")]
	pub root: PathBuf,
	/// Glob patterns selecting the source files of a project.
	#[serde(default = "default_include_patterns")]
	pub include: Vec<String>,
	/// Maximum source file size in bytes. Larger files are an error.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
}

impl Default for ContentConfig {
	fn default() -> Self {
		Self {
			root: default_content_root(),
			include: default_include_patterns(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

fn default_content_root() -> PathBuf {
	PathBuf::from("content")
}

fn default_include_patterns() -> Vec<String> {
	DEFAULT_INCLUDE_PATTERNS.iter().map(|&p| p.into()).collect()
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

/// Load configuration from the first config file candidate found under
/// `dir`. Returns `Ok(None)` when no config file exists, in which case
/// callers fall back to [`SidenoteConfig::default`].
pub fn load_config(dir: &Path) -> SidenoteResult<Option<SidenoteConfig>> {
	for candidate in CONFIG_FILE_CANDIDATES {
		let path = dir.join(candidate);
		if !path.is_file() {
			continue;
		}

		let raw = std::fs::read_to_string(&path)?;
		let config = toml::from_str(&raw)
			.map_err(|error| SidenoteError::ConfigParse(format!("{}: {error}", path.display())))?;
		tracing::debug!(path = %path.display(), "loaded config");

		return Ok(Some(config));
	}

	Ok(None)
}
