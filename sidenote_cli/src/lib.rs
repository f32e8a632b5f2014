use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Extract inline annotations from project source code.",
	long_about = "sidenote extracts lightweight annotations embedded in source-code comments \
	              (`note:`, `note-start`, `note-end`) and emits the cleaned code together with \
	              positioned annotation records for the rendering layer.\n\nQuick start:\n  \
	              sidenote extract blink.ino  Show the annotations in one file\n  sidenote \
	              check               Validate every project source file\n  sidenote list       \
	              \x20        List projects, files, and annotation counts"
)]
pub struct SidenoteCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the content root (a directory of project folders, or any
	/// directory of source files).
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Extract annotations from a single source file.
	///
	/// Prints the annotation list (text) or the full extraction result with
	/// the cleaned code (json). Exits with status 1 when the file has an
	/// annotation defect.
	Extract {
		/// The source file to extract from.
		file: PathBuf,

		/// Output format.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Validate annotations in every project source file.
	///
	/// Walks the content root, runs extraction over each matched source
	/// file, and reports every defect found. Files fail independently, so a
	/// single broken sketch never hides problems elsewhere. Exits with
	/// status 1 when any file has a defect — ideal as a page-build gate in
	/// CI.
	Check {
		/// Output format.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List projects with their source files and annotation counts.
	List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable output.
	Text,
	/// Machine-readable JSON.
	Json,
}
