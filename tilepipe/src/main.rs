mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Render one tile of a configured layer
	Render(tools::render::Subcommand),

	/// Print the fetch order of the tiles around a tile
	Order(tools::order::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Render(arguments) => tools::render::run(arguments),
		Commands::Order(arguments) => tools::order::run(arguments),
	}
}

#[cfg(test)]
mod tests {
	use crate::{Cli, run};
	use anyhow::Result;
	use clap::Parser;

	pub fn run_command(arg_vec: Vec<&str>) -> Result<String> {
		let cli = Cli::try_parse_from(arg_vec)?;
		let msg = format!("{cli:?}");
		run(cli)?;
		Ok(msg)
	}

	#[test]
	fn help() {
		let err = run_command(vec!["tilepipe"]).unwrap_err().to_string();
		assert!(err.starts_with("A pipeline engine for rendering secured vector map tiles"));
		assert!(err.contains("\nUsage: tilepipe [OPTIONS] <COMMAND>"));
	}

	#[test]
	fn version() {
		let err = run_command(vec!["tilepipe", "-V"]).unwrap_err().to_string();
		assert!(err.starts_with("tilepipe "));
	}

	#[test]
	fn render_subcommand() {
		let output = run_command(vec!["tilepipe", "render"]).unwrap_err().to_string();
		assert!(output.starts_with("Render one tile of a configured layer"));
	}

	#[test]
	fn order_subcommand() {
		let output = run_command(vec!["tilepipe", "order"]).unwrap_err().to_string();
		assert!(output.starts_with("Print the fetch order of the tiles around a tile"));
	}
}
