mod common;

use serde_json::Value;
use sidenote_core::AnyEmptyResult;

#[test]
fn extract_reports_annotations() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("blink.ino");
	std::fs::write(&file, "int led = 13; // note: the built-in LED\n")?;

	common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("extract")
		.arg(&file)
		.assert()
		.success()
		.stdout(predicates::str::contains("the built-in LED"))
		.stdout(predicates::str::contains("line 1"));

	Ok(())
}

#[test]
fn extract_reports_empty_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("plain.ino");
	std::fs::write(&file, "int led = 13;\n")?;

	common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("extract")
		.arg(&file)
		.assert()
		.success()
		.stdout(predicates::str::contains("no annotations"));

	Ok(())
}

#[test]
fn extract_json_carries_code_and_annotations() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("blink.ino");
	std::fs::write(&file, "int led = 13; // note: the built-in LED\n")?;

	let assert = common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("extract")
		.arg(&file)
		.arg("--format")
		.arg("json")
		.assert()
		.success();

	let value: Value = serde_json::from_slice(&assert.get_output().stdout)?;
	assert_eq!(value["code"], "int led = 13;\n");
	assert_eq!(value["annotations"][0]["start_line"], 0);
	assert_eq!(value["annotations"][0]["end_line"], 0);
	assert_eq!(value["annotations"][0]["text"], "the built-in LED");
	assert_eq!(value["annotations"][0]["anchor_column"], 13);

	Ok(())
}

#[test]
fn extract_fails_on_annotation_defect() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("broken.ino");
	std::fs::write(&file, "// note-start\nint x;\n")?;

	common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("extract")
		.arg(&file)
		.assert()
		.failure()
		.code(1)
		.stderr(predicates::str::contains("unterminated annotation"));

	Ok(())
}

#[test]
fn extract_missing_file_is_an_operational_error() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::sidenote_cmd()
		.env("NO_COLOR", "1")
		.arg("extract")
		.arg(tmp.path().join("nope.ino"))
		.assert()
		.failure()
		.code(2);

	Ok(())
}
