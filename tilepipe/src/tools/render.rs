use anyhow::{Context, Result};
use clap::Args;
use std::{
	fs,
	io::{Write, stdout},
	path::PathBuf,
};
use tilepipe::{
	command::{GetRenderedTileCommand, RenderedTileRequest, RenderedTileResponse},
	config::Config,
};
use tilepipe_core::{Renderer, TileCode};

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// YAML configuration describing layers, security and rendering rules
	#[arg(required = true)]
	config: PathBuf,

	/// id of the layer to render
	#[arg(required = true)]
	layer: String,

	/// tile to render, as "level-x-y" or "level/x/y"
	#[arg(required = true)]
	tile: String,

	/// pixels per world unit
	/// [default: tile size of the layer grid]
	#[arg(long, short, verbatim_doc_comment)]
	scale: Option<f64>,

	/// CRS of the rendered tile, e.g. "EPSG:3857" [default: CRS of the layer]
	#[arg(long)]
	crs: Option<String>,

	/// name of a style of the layer [default: first style]
	#[arg(long)]
	style: Option<String>,

	/// vector markup to write
	#[arg(long, short, default_value = "svg", value_parser = ["svg", "vml"])]
	renderer: String,

	/// only render features matching this filter expression, e.g. "size > 5"
	#[arg(long, short)]
	filter: Option<String>,

	/// do not paint labels
	#[arg(long)]
	no_labels: bool,

	/// write the tile to this file instead of stdout
	#[arg(long, short)]
	output: Option<PathBuf>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let response = render(arguments)?;
	log::info!(
		"rendered tile {} with {} features as {} ({}x{} pixels, {} bytes)",
		response.code,
		response.feature_count,
		response.content_type,
		response.width,
		response.height,
		response.data.len()
	);
	match &arguments.output {
		Some(path) => fs::write(path, &response.data).with_context(|| format!("can not write {path:?}"))?,
		None => stdout().write_all(&response.data)?,
	}
	Ok(())
}

fn render(arguments: &Subcommand) -> Result<RenderedTileResponse> {
	let config = Config::from_path(&arguments.config)?;
	let code: TileCode = arguments.tile.parse()?;

	let mut request = RenderedTileRequest::new(&arguments.layer, code);
	if let Ok(layer) = config.layer(&arguments.layer) {
		request.style = layer.style(arguments.style.as_deref())?;
	}
	request.crs.clone_from(&arguments.crs);
	request.scale = arguments.scale;
	request.filter.clone_from(&arguments.filter);
	request.renderer = arguments.renderer.parse::<Renderer>()?;
	request.paint_labels = !arguments.no_labels;

	GetRenderedTileCommand::new(config.build_services()?).execute(&request)
}
