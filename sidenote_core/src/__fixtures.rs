use std::path::Path;

use crate::Annotation;

/// A small annotated sketch exercising the trailing single-line form and a
/// block annotation with a multi-line body.
pub(crate) const BLINK_SKETCH: &str = "int ledPin = 13; // note: the built-in LED on most boards\n\
                                       \n\
                                       // note-start\n\
                                       // Pulse the LED once per second. The delay is\n\
                                       // blocking, which is fine for this sketch.\n\
                                       void loop() {\n\
                                       \x20 digitalWrite(ledPin, HIGH);\n\
                                       \x20 delay(500);\n\
                                       }\n\
                                       // note-end\n";

/// The displayed code expected from [`BLINK_SKETCH`].
pub(crate) const BLINK_CODE: &str = "int ledPin = 13;\n\
                                     \n\
                                     void loop() {\n\
                                     \x20 digitalWrite(ledPin, HIGH);\n\
                                     \x20 delay(500);\n\
                                     }\n";

/// A whole-line annotation anchored to a line range.
pub(crate) fn annotation(start_line: usize, end_line: usize, text: &str) -> Annotation {
	Annotation {
		start_line,
		end_line,
		text: text.into(),
		anchor_column: None,
	}
}

/// A trailing single-line annotation with its column anchor.
pub(crate) fn inline_annotation(line: usize, column: usize, text: &str) -> Annotation {
	Annotation {
		start_line: line,
		end_line: line,
		text: text.into(),
		anchor_column: Some(column),
	}
}

/// Write a minimal project directory (metadata, write-up, sketch, header,
/// and a non-source asset) under `root/simon`.
pub(crate) fn write_simon_project(root: &Path) -> std::io::Result<()> {
	let dir = root.join("simon");
	std::fs::create_dir_all(dir.join("images"))?;
	std::fs::write(
		dir.join("project.json"),
		r#"{"name": "Simon Game", "author": "Ada", "description": "A memory game"}"#,
	)?;
	std::fs::write(dir.join("README.md"), "# Simon Game\n\nA memory game.\n")?;
	std::fs::write(dir.join("simon.ino"), BLINK_SKETCH)?;
	std::fs::write(dir.join("pitches.h"), "#define NOTE_C4 262\n")?;
	std::fs::write(dir.join("images").join("thumbnail.png"), [0x89, b'P', b'N', b'G'])?;

	Ok(())
}
