use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use sidenote_cli::Commands;
use sidenote_cli::OutputFormat;
use sidenote_cli::SidenoteCli;
use sidenote_core::AnyResult;
use sidenote_core::SidenoteError;
use sidenote_core::extract_annotations_with_syntax;
use sidenote_core::load_config;
use sidenote_core::project::AnnotatedSourceFile;
use sidenote_core::project::ProjectSourceFile;
use sidenote_core::project::ScanOptions;
use sidenote_core::project::annotate_project;
use sidenote_core::project::list_projects;
use sidenote_core::project::load_project_info;
use sidenote_core::project::load_project_sources;
use sidenote_core::project::scan_source_files;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = SidenoteCli::parse();

	// Respect NO_COLOR, the --no-color flag, and non-terminal stdout.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	if args.verbose {
		tracing_subscriber::fmt()
			.with_env_filter(
				tracing_subscriber::EnvFilter::try_from_default_env()
					.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
			)
			.with_writer(std::io::stderr)
			.init();
	}

	let result = match args.command {
		Some(Commands::Extract { ref file, format }) => run_extract(&args, file, format),
		Some(Commands::Check { format }) => run_check(&args, format),
		Some(Commands::List) => run_list(&args),
		None => {
			eprintln!("No subcommand specified. Run `sidenote --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<SidenoteError>() {
			Ok(sidenote_err) => {
				let report: miette::Report = (*sidenote_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Render an annotation defect and bail with the content-defect exit code.
fn exit_with_defect(error: SidenoteError) -> ! {
	let report: miette::Report = error.into();
	eprintln!("{report:?}");
	process::exit(1);
}

fn run_extract(args: &SidenoteCli, file: &Path, format: OutputFormat) -> AnyResult<()> {
	let source = std::fs::read_to_string(file)?;
	let name = file.display().to_string();
	let config_dir = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
	let syntax = load_config(&config_dir)?
		.map(|config| config.syntax)
		.unwrap_or_default();

	let result = match extract_annotations_with_syntax(&source, &name, &syntax) {
		Ok(result) => result,
		Err(error) => exit_with_defect(error),
	};

	match format {
		OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
		OutputFormat::Text => {
			if result.annotations.is_empty() {
				println!("no annotations in {name}");
				return Ok(());
			}
			for annotation in &result.annotations {
				let range = if annotation.start_line == annotation.end_line {
					format!("line {}", annotation.start_line + 1)
				} else {
					format!(
						"lines {}-{}",
						annotation.start_line + 1,
						annotation.end_line + 1
					)
				};
				let mut text_lines = annotation.text.lines();
				println!(
					"{}  {}",
					colored!(format!("{range:>11}"), bold),
					text_lines.next().unwrap_or_default()
				);
				for rest in text_lines {
					println!("{:>11}  {rest}", "");
				}
			}
		}
	}

	Ok(())
}

/// One row of `check` output: a scanned file and what extraction found.
#[derive(Serialize)]
struct FileReport {
	project: String,
	file: String,
	primary: bool,
	annotations: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}

impl FileReport {
	fn new(project: &str, file: AnnotatedSourceFile) -> Self {
		let (annotations, error) = match &file.outcome {
			Ok(result) => (result.annotations.len(), None),
			Err(defect) => (0, Some(defect.to_string())),
		};

		Self {
			project: project.to_string(),
			file: file.name,
			primary: file.primary,
			annotations,
			error,
		}
	}

	fn label(&self) -> String {
		if self.project.is_empty() {
			self.file.clone()
		} else {
			format!("{}/{}", self.project, self.file)
		}
	}
}

/// Resolve the content root and scan options for `check` and `list`.
///
/// The configured content directory is used when it exists under the given
/// path; otherwise the path itself is treated as the content root.
fn scan_context(args: &SidenoteCli) -> AnyResult<(PathBuf, ScanOptions)> {
	let root = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
	let config = load_config(&root)?;
	let options = ScanOptions::from_config(config.as_ref());

	let configured = config
		.as_ref()
		.map_or_else(|| root.join("content"), |config| root.join(&config.content.root));
	let content_root = if configured.is_dir() { configured } else { root };

	Ok((content_root, options))
}

fn run_check(args: &SidenoteCli, format: OutputFormat) -> AnyResult<()> {
	let (content_root, options) = scan_context(args)?;
	let projects = list_projects(&content_root)?;

	let mut tasks: Vec<(String, ProjectSourceFile)> = Vec::new();
	if projects.is_empty() {
		// No project directories: treat the content root as a flat source
		// directory.
		for file in scan_source_files(&content_root, &options)? {
			tasks.push((String::new(), file));
		}
	} else {
		for id in &projects {
			for file in load_project_sources(&content_root, id, &options)? {
				tasks.push((id.clone(), file));
			}
		}
	}

	// Extraction is pure, so files fan out across threads with no ordering
	// dependency; results come back in input order.
	let joined: Vec<std::thread::Result<FileReport>> = std::thread::scope(|scope| {
		let handles: Vec<_> = tasks
			.into_iter()
			.map(|(project, file)| {
				let options = &options;
				scope.spawn(move || {
					let outcome =
						extract_annotations_with_syntax(&file.code, &file.name, &options.syntax);
					FileReport::new(
						&project,
						AnnotatedSourceFile {
							name: file.name,
							primary: file.primary,
							outcome,
						},
					)
				})
			})
			.collect();
		handles.into_iter().map(std::thread::ScopedJoinHandle::join).collect()
	});

	let mut reports = Vec::with_capacity(joined.len());
	for result in joined {
		match result {
			Ok(report) => reports.push(report),
			Err(_) => return Err("annotation worker panicked".into()),
		}
	}

	let defects = reports.iter().filter(|report| report.error.is_some()).count();

	match format {
		OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
		OutputFormat::Text => {
			for report in &reports {
				match &report.error {
					Some(message) => {
						println!("{} {}: {message}", colored!("defect", red), report.label());
					}
					None if args.verbose => {
						println!("{}: {} annotation(s)", report.label(), report.annotations);
					}
					None => {}
				}
			}

			if defects == 0 {
				println!(
					"{}",
					colored!(format!("all {} file(s) clean", reports.len()), green)
				);
			} else {
				println!(
					"{}",
					colored!(
						format!("{defects} of {} file(s) have annotation defects", reports.len()),
						red
					)
				);
			}
		}
	}

	if defects > 0 {
		process::exit(1);
	}

	Ok(())
}

fn run_list(args: &SidenoteCli) -> AnyResult<()> {
	let (content_root, options) = scan_context(args)?;
	let projects = list_projects(&content_root)?;

	if projects.is_empty() {
		println!("no projects found under {}", content_root.display());
		return Ok(());
	}

	for id in &projects {
		let info = load_project_info(&content_root, id)?;
		println!("{}  {}", colored!(id, bold), info.name);

		for file in annotate_project(&content_root, id, &options)? {
			let marker = if file.primary { " (primary)" } else { "" };
			let status = match &file.outcome {
				Ok(result) => format!("{} annotation(s)", result.annotations.len()),
				Err(defect) => colored!(format!("defect: {defect}"), red),
			};
			println!("  {}{marker}: {status}", file.name);
		}
	}

	Ok(())
}
