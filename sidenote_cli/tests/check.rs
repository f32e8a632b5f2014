mod common;

use std::path::Path;

use serde_json::Value;
use sidenote_core::AnyEmptyResult;

/// Write a minimal project (metadata, sketch, header) under `root/<id>`.
fn write_project(root: &Path, id: &str) -> std::io::Result<()> {
	let dir = root.join(id);
	std::fs::create_dir_all(&dir)?;
	std::fs::write(
		dir.join("project.json"),
		format!(r#"{{"name": "Project {id}"}}"#),
	)?;
	std::fs::write(
		dir.join(format!("{id}.ino")),
		"int led = 13; // note: the built-in LED\nvoid setup() {}\n",
	)?;
	std::fs::write(dir.join("pitches.h"), "#define NOTE_C4 262\n")?;

	Ok(())
}

#[test]
fn check_passes_on_clean_content() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), "simon")?;
	write_project(tmp.path(), "blink")?;

	common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("all 4 file(s) clean"));

	Ok(())
}

#[test]
fn check_fails_on_defect() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), "simon")?;
	std::fs::write(
		tmp.path().join("simon").join("broken.ino"),
		"// note-start\nint x;\n",
	)?;

	common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(1)
		.stdout(predicates::str::contains("defect"))
		.stdout(predicates::str::contains("broken.ino"));

	Ok(())
}

#[test]
fn check_json_reports_per_file_outcomes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), "simon")?;
	std::fs::write(
		tmp.path().join("simon").join("broken.ino"),
		"// note-start\nint x;\n",
	)?;

	let assert = common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.arg("--format")
		.arg("json")
		.assert()
		.failure()
		.code(1);

	let reports: Value = serde_json::from_slice(&assert.get_output().stdout)?;
	let reports = reports.as_array().expect("check --format json emits an array");
	assert_eq!(reports.len(), 3);

	let broken = reports
		.iter()
		.find(|report| report["file"] == "broken.ino")
		.expect("broken.ino should be reported");
	assert!(
		broken["error"]
			.as_str()
			.expect("broken.ino should carry an error")
			.contains("unterminated annotation")
	);

	let sketch = reports
		.iter()
		.find(|report| report["file"] == "simon.ino")
		.expect("simon.ino should be reported");
	assert_eq!(sketch["error"], Value::Null);
	assert_eq!(sketch["annotations"], 1);

	Ok(())
}

#[test]
fn check_scans_a_flat_source_directory() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("blink.ino"),
		"int led = 13; // note: the built-in LED\n",
	)?;

	common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("all 1 file(s) clean"));

	Ok(())
}

#[test]
fn check_honors_config_include_patterns() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), "simon")?;
	// Restrict scanning to sketches; the broken header is never read.
	std::fs::write(
		tmp.path().join("sidenote.toml"),
		"[content]\nroot = \".\"\ninclude = [\"*.ino\"]\n",
	)?;
	std::fs::write(
		tmp.path().join("simon").join("broken.h"),
		"// note-start\nint x;\n",
	)?;

	common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("all 1 file(s) clean"));

	Ok(())
}

#[test]
fn list_shows_primary_sketch_and_counts() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path(), "simon")?;

	common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Project simon"))
		.stdout(predicates::str::contains("simon.ino (primary): 1 annotation(s)"))
		.stdout(predicates::str::contains("pitches.h: 0 annotation(s)"));

	Ok(())
}
