use assert_cmd::Command;

pub fn sidenote_cmd() -> Command {
	Command::cargo_bin("sidenote").expect("sidenote binary should build")
}
