use super::CommandServices;
use anyhow::{Context, Result, bail, ensure};
use tilepipe_core::{NamedStyle, Renderer, TileCode, TileMetadata};
use tilepipe_geometry::Crs;
use tilepipe_render::{InternalTile, VectorLayerInfo};

/// A request for one painted tile.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedTileRequest {
	pub layer_id: String,
	pub code: TileCode,
	/// CRS identifier; the layer CRS if `None`.
	pub crs: Option<String>,
	/// Pixels per world unit; if `None` a tile is as large as the layer grid's tile size.
	pub scale: Option<f64>,
	pub style: NamedStyle,
	pub filter: Option<String>,
	pub renderer: Renderer,
	pub paint_geometries: bool,
	pub paint_labels: bool,
}

impl RenderedTileRequest {
	/// A request painting the geometries of `code` with default settings.
	#[must_use]
	pub fn new(layer_id: &str, code: TileCode) -> Self {
		RenderedTileRequest {
			layer_id: layer_id.to_string(),
			code,
			crs: None,
			scale: None,
			style: NamedStyle::new(layer_id, Vec::new()),
			filter: None,
			renderer: Renderer::Svg,
			paint_geometries: true,
			paint_labels: false,
		}
	}

	fn to_metadata(&self, info: &VectorLayerInfo) -> Result<TileMetadata> {
		let crs = self.crs.clone().unwrap_or_else(|| info.crs.to_string());
		let scale = match self.scale {
			Some(scale) => scale,
			None => {
				let requested: Crs = crs.parse()?;
				ensure!(
					requested == info.crs,
					"a scale is needed to render layer '{}' in {requested}",
					info.id
				);
				f64::from(info.grid.tile_width) / info.grid.tile_bounds(&self.code).width()
			}
		};

		let mut metadata = TileMetadata::new(&self.layer_id, &crs, self.code, scale);
		metadata.style = self.style.clone();
		metadata.filter.clone_from(&self.filter);
		metadata.renderer = self.renderer;
		metadata.paint_geometries = self.paint_geometries;
		metadata.paint_labels = self.paint_labels;
		Ok(metadata)
	}
}

/// A painted tile.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedTileResponse {
	pub code: TileCode,
	pub content_type: &'static str,
	pub data: Vec<u8>,
	pub width: u32,
	pub height: u32,
	/// Number of features painted.
	pub feature_count: usize,
	pub clipped: bool,
}

impl TryFrom<InternalTile> for RenderedTileResponse {
	type Error = anyhow::Error;

	fn try_from(tile: InternalTile) -> Result<Self> {
		let Some(content) = &tile.content else {
			bail!("tile {} has not been painted", tile.element_id());
		};
		Ok(RenderedTileResponse {
			code: tile.code,
			content_type: content.content_type(),
			data: content.as_bytes().to_vec(),
			width: tile.screen_width,
			height: tile.screen_height,
			feature_count: tile.features.len(),
			clipped: tile.clipped,
		})
	}
}

/// Renders one tile of a visible layer with the strategy the rules choose.
pub struct GetRenderedTileCommand {
	services: CommandServices,
}

impl GetRenderedTileCommand {
	#[must_use]
	pub fn new(services: CommandServices) -> Self {
		GetRenderedTileCommand { services }
	}

	/// Unknown and hidden layers are reported alike.
	pub fn execute(&self, request: &RenderedTileRequest) -> Result<RenderedTileResponse> {
		let render = &self.services.render;
		ensure!(
			render.security.is_layer_visible(&request.layer_id),
			"layer '{}' is not visible",
			request.layer_id
		);
		let layer = render
			.layers
			.get(&request.layer_id)
			.with_context(|| format!("layer '{}' is not visible", request.layer_id))?;

		let metadata = request.to_metadata(layer.info())?;
		let strategy = self.services.strategies.strategy_for(&metadata)?;
		log::debug!(
			"rendering tile {} of layer '{}' at scale {} with the {} strategy",
			metadata.code,
			metadata.layer_id,
			metadata.scale,
			strategy.kind()
		);
		let tile = strategy.paint(&metadata, render)?;
		RenderedTileResponse::try_from(tile)
	}
}
