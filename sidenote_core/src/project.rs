use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::WalkBuilder;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::ExtractionResult;
use crate::SidenoteError;
use crate::SidenoteResult;
use crate::config::DEFAULT_INCLUDE_PATTERNS;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::config::MarkerSyntax;
use crate::config::SidenoteConfig;
use crate::engine::extract_annotations_with_syntax;

/// The metadata file that marks a directory as a project.
pub const PROJECT_METADATA_FILE: &str = "project.json";

/// The write-up file rendered above the source code.
pub const PROJECT_TEXT_FILE: &str = "README.md";

/// Options controlling how project source files are discovered and scanned.
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Globs selecting which file names count as source code.
	pub include_set: GlobSet,
	/// Maximum source file size in bytes.
	pub max_file_size: u64,
	/// Marker syntax used when extracting annotations.
	pub syntax: MarkerSyntax,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			include_set: build_glob_set(DEFAULT_INCLUDE_PATTERNS.iter().copied()),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			syntax: MarkerSyntax::default(),
		}
	}
}

impl ScanOptions {
	/// Construct [`ScanOptions`] from a loaded config, falling back to the
	/// defaults when no config file was found.
	pub fn from_config(config: Option<&SidenoteConfig>) -> Self {
		let Some(config) = config else {
			return Self::default();
		};

		Self {
			include_set: build_glob_set(config.content.include.iter().map(String::as_str)),
			max_file_size: config.content.max_file_size,
			syntax: config.syntax.clone(),
		}
	}
}

/// Build a glob set from patterns, skipping any that fail to parse.
fn build_glob_set<'a>(patterns: impl Iterator<Item = &'a str>) -> GlobSet {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		if let Ok(glob) = Glob::new(pattern) {
			builder.add(glob);
		}
	}
	builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Project metadata loaded from `project.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
	/// The project's directory name. Assigned by the loader, not read from
	/// the metadata file.
	#[serde(default)]
	pub id: String,
	/// Human-readable project name.
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub author: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Embed URL of an interactive simulation, when the project has one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub simulation: Option<String>,
	/// Project-relative path of the thumbnail image.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub thumbnail: Option<String>,
}

/// One source file of a project, before annotation extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSourceFile {
	/// Path relative to the project directory.
	pub name: String,
	/// Raw file contents, annotation markers included.
	pub code: String,
	/// The sketch file is primary; the rendering layer leads with it.
	pub primary: bool,
}

/// The outcome of running extraction over one source file.
///
/// Files fail independently: a defect in one file never affects its
/// siblings, and the page-build caller decides what to do with each failure.
#[derive(Debug)]
pub struct AnnotatedSourceFile {
	/// Path relative to the project directory.
	pub name: String,
	pub primary: bool,
	pub outcome: SidenoteResult<ExtractionResult>,
}

/// List project ids (directories containing a `project.json`) under the
/// content root, in stable name order.
pub fn list_projects(root: &Path) -> SidenoteResult<Vec<String>> {
	let mut ids = Vec::new();

	for entry in std::fs::read_dir(root)? {
		let entry = entry?;
		let path = entry.path();
		if !path.is_dir() || !path.join(PROJECT_METADATA_FILE).is_file() {
			continue;
		}
		if let Some(name) = entry.file_name().to_str() {
			ids.push(name.to_string());
		}
	}

	ids.sort();
	Ok(ids)
}

/// Load a project's metadata from its `project.json`.
pub fn load_project_info(root: &Path, id: &str) -> SidenoteResult<ProjectInfo> {
	let dir = project_dir(root, id)?;
	let path = dir.join(PROJECT_METADATA_FILE);

	let raw = std::fs::read_to_string(&path).map_err(|error| SidenoteError::ProjectMetadata {
		path: path.display().to_string(),
		reason: error.to_string(),
	})?;
	let mut info: ProjectInfo =
		serde_json::from_str(&raw).map_err(|error| SidenoteError::ProjectMetadata {
			path: path.display().to_string(),
			reason: error.to_string(),
		})?;
	info.id = id.to_string();

	Ok(info)
}

/// Load the project write-up markdown.
pub fn load_project_text(root: &Path, id: &str) -> SidenoteResult<String> {
	let dir = project_dir(root, id)?;
	Ok(std::fs::read_to_string(dir.join(PROJECT_TEXT_FILE))?)
}

/// Load a project's source files in stable name order, with the sketch
/// hoisted to the front and flagged primary.
pub fn load_project_sources(
	root: &Path,
	id: &str,
	options: &ScanOptions,
) -> SidenoteResult<Vec<ProjectSourceFile>> {
	let dir = project_dir(root, id)?;
	scan_source_files(&dir, options)
}

/// Collect the source files under `dir` matched by the include globs.
///
/// Files come back sorted by relative path; the first `.ino` file (or the
/// first file, when there is no sketch) is moved to the front and marked
/// primary.
pub fn scan_source_files(dir: &Path, options: &ScanOptions) -> SidenoteResult<Vec<ProjectSourceFile>> {
	let mut found: Vec<(String, PathBuf)> = Vec::new();

	for entry in WalkBuilder::new(dir).build() {
		let Ok(entry) = entry else { continue };
		if !entry.file_type().is_some_and(|kind| kind.is_file()) {
			continue;
		}
		let Some(name) = entry.file_name().to_str() else {
			continue;
		};
		if !options.include_set.is_match(name) {
			continue;
		}

		let relative = entry
			.path()
			.strip_prefix(dir)
			.unwrap_or(entry.path())
			.display()
			.to_string();
		found.push((relative, entry.into_path()));
	}

	found.sort();
	debug!(dir = %dir.display(), files = found.len(), "scanned source files");

	let mut sources = Vec::with_capacity(found.len());
	for (name, path) in found {
		let size = std::fs::metadata(&path)?.len();
		if size > options.max_file_size {
			return Err(SidenoteError::FileTooLarge {
				path: path.display().to_string(),
				size,
				limit: options.max_file_size,
			});
		}

		sources.push(ProjectSourceFile {
			name,
			code: std::fs::read_to_string(&path)?,
			primary: false,
		});
	}

	let sketch = sources.iter().position(|file| file.name.ends_with(".ino"));
	if let Some(at) = sketch.or((!sources.is_empty()).then_some(0)) {
		let file = sources.remove(at);
		sources.insert(0, file);
		sources[0].primary = true;
	}

	Ok(sources)
}

/// Run extraction over every source file of a project, capturing defects per
/// file.
pub fn annotate_project(
	root: &Path,
	id: &str,
	options: &ScanOptions,
) -> SidenoteResult<Vec<AnnotatedSourceFile>> {
	let sources = load_project_sources(root, id, options)?;
	Ok(annotate_sources(sources, options))
}

/// Extract annotations from already-loaded source files. Each file is an
/// independent, pure computation; outcomes are collected rather than
/// short-circuited.
pub fn annotate_sources(
	sources: Vec<ProjectSourceFile>,
	options: &ScanOptions,
) -> Vec<AnnotatedSourceFile> {
	sources
		.into_iter()
		.map(|file| {
			let outcome = extract_annotations_with_syntax(&file.code, &file.name, &options.syntax);
			AnnotatedSourceFile {
				name: file.name,
				primary: file.primary,
				outcome,
			}
		})
		.collect()
}

fn project_dir(root: &Path, id: &str) -> SidenoteResult<PathBuf> {
	let dir = root.join(id);
	if !dir.is_dir() {
		return Err(SidenoteError::MissingProject {
			id: id.to_string(),
			root: root.display().to_string(),
		});
	}
	Ok(dir)
}
