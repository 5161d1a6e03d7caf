use anyhow::Result;
use clap::Args;
use tilepipe_core::{TileCode, TileRange};

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// zoom level of the tiles
	#[arg(required = true)]
	level: u8,

	/// column of the tile in focus
	#[arg(required = true)]
	x: u32,

	/// row of the tile in focus, 0 is the top row
	#[arg(required = true)]
	y: u32,

	/// number of columns around the focus
	#[arg(long, default_value_t = 3)]
	width: u32,

	/// number of rows around the focus
	#[arg(long, default_value_t = 3)]
	height: u32,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	println!("{}", fetch_order(arguments)?.join("\n"));
	Ok(())
}

fn fetch_order(arguments: &Subcommand) -> Result<Vec<String>> {
	let center = TileCode::new(arguments.level, arguments.x, arguments.y)?;
	let range = TileRange::around(&center, arguments.width, arguments.height)?;
	log::debug!("ordering {} tiles of {range:?}", range.count());
	Ok(range.spiral_codes(&center).iter().map(TileCode::to_string).collect())
}
