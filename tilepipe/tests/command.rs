use assert_cmd::{Command, cargo};
use predicates::{prelude::*, str};
use rstest::rstest;
use tempfile::tempdir;
use test_utilities::{BINARY_NAME, get_testdata};

#[test]
fn command() {
	Command::new(cargo::cargo_bin!())
		.assert()
		.failure()
		.code(2)
		.stdout(str::is_empty())
		.stderr(str::contains(format!("Usage: {BINARY_NAME} [OPTIONS] <COMMAND>")));
}

#[rstest]
#[case("render", "[OPTIONS] <CONFIG> <LAYER> <TILE>")]
#[case("order", "[OPTIONS] <LEVEL> <X> <Y>")]
fn subcommand(#[case] sub_command: &str, #[case] usage: &str) {
	Command::new(cargo::cargo_bin!())
		.arg(sub_command)
		.assert()
		.failure()
		.code(2)
		.stdout(str::is_empty())
		.stderr(str::contains(format!("Usage: {BINARY_NAME} {sub_command} {usage}")));
}

#[test]
fn render_svg_to_stdout() {
	Command::new(cargo::cargo_bin!())
		.args(["render", &get_testdata("config.yml"), "beans", "0-0-0", "--no-labels"])
		.assert()
		.success()
		.stdout(str::starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#))
		.stdout(str::contains(r##"<use xlink:href="#beans.0-0-0.symbol.1" x="134.4" y="121.6"/>"##))
		.stdout(str::contains(".labels").not());
}

#[test]
fn render_vml_to_stdout() {
	Command::new(cargo::cargo_bin!())
		.args(["render", &get_testdata("config.yml"), "beans", "1-1-0", "-r", "vml"])
		.assert()
		.success()
		.stdout(str::starts_with(r#"<vml:group id="beans.1-1-0.features""#));
}

#[test]
fn render_png_to_file() {
	let dir = tempdir().unwrap();
	let path = dir.path().join("tile.png");
	Command::new(cargo::cargo_bin!())
		.args(["render", &get_testdata("config.yml"), "beans", "2/1/1", "--scale", "60", "-o"])
		.arg(&path)
		.assert()
		.success()
		.stdout(str::is_empty());
	let data = std::fs::read(&path).unwrap();
	assert_eq!(&data[..4], &[0x89, b'P', b'N', b'G']);
}

#[rstest]
#[case(&["secret", "0-0-0"], "layer 'secret' is not visible")]
#[case(&["beans", "0-9-9"], "x (9) out of bounds for level 0")]
#[case(&["beans", "0-0-0", "--filter", "size >"], "invalid filter in tile request for layer 'beans'")]
fn render_errors(#[case] args: &[&str], #[case] message: &str) {
	Command::new(cargo::cargo_bin!())
		.arg("render")
		.arg(get_testdata("config.yml"))
		.args(args)
		.assert()
		.failure()
		.code(1)
		.stderr(str::contains(message));
}

#[test]
fn order() {
	Command::new(cargo::cargo_bin!())
		.args(["order", "3", "3", "2"])
		.assert()
		.success()
		.stdout("3-3-2\n3-3-1\n3-4-1\n3-4-2\n3-4-3\n3-3-3\n3-2-3\n3-2-2\n3-2-1\n");
}
