use super::{TILE_IMAGE_STEP, TILE_PAINT_STEP};
use crate::{
	InternalTile,
	paint::{SvgTilePainter, TileImageCreator, TilePainter, VmlTilePainter},
};
use anyhow::Result;
use tilepipe_core::{Renderer, TileMetadata};
use tilepipe_pipeline::{PipelineContext, PipelineStep};

/// Paints the tile as SVG or VML, as requested by the renderer hint.
pub struct TilePaintStep;

impl PipelineStep<TileMetadata, InternalTile> for TilePaintStep {
	fn id(&self) -> &str {
		TILE_PAINT_STEP
	}

	fn execute(&self, request: &TileMetadata, _context: &mut PipelineContext, response: &mut InternalTile) -> Result<()> {
		match request.renderer {
			Renderer::Svg => SvgTilePainter.paint(response, request),
			Renderer::Vml => VmlTilePainter.paint(response, request),
		}
	}
}

/// Rasterizes the tile into a PNG image.
pub struct TileImageStep;

impl PipelineStep<TileMetadata, InternalTile> for TileImageStep {
	fn id(&self) -> &str {
		TILE_IMAGE_STEP
	}

	fn execute(&self, request: &TileMetadata, _context: &mut PipelineContext, response: &mut InternalTile) -> Result<()> {
		TileImageCreator.paint(response, request)
	}
}
