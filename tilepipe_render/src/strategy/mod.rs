//! Rendering strategies and the rules choosing between them.
//!
//! A strategy turns a [`TileMetadata`] into a painted [`InternalTile`] by
//! running one of the tile pipelines. The vector strategy produces SVG or
//! VML markup, the raster strategy a PNG image.

mod factory;
mod rules;

pub use factory::RenderingStrategyFactory;
pub use rules::{RenderBetweenScales, RenderForLayers, RenderingRule};

use crate::{
	InternalTile, LayerRegistry, RenderError, RenderErrorKind, SecurityContext,
	steps::{RASTER_TILE_PIPELINE, VECTOR_TILE_PIPELINE},
};
use anyhow::Result;
use serde::Deserialize;
use std::{fmt, str::FromStr, sync::Arc};
use tilepipe_core::TileMetadata;
use tilepipe_pipeline::{PipelineName, PipelineService};

pub type TilePipelineService = PipelineService<TileMetadata, InternalTile>;

/// What a strategy needs to render a tile.
#[derive(Clone)]
pub struct RenderServices {
	pub pipelines: TilePipelineService,
	pub layers: Arc<LayerRegistry>,
	pub security: Arc<dyn SecurityContext>,
}

/// The kinds of output a strategy produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderingKind {
	#[default]
	Vector,
	Raster,
}

impl fmt::Display for RenderingKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			RenderingKind::Vector => "vector",
			RenderingKind::Raster => "raster",
		})
	}
}

impl FromStr for RenderingKind {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		Ok(match s.to_ascii_lowercase().as_str() {
			"vector" => RenderingKind::Vector,
			"raster" => RenderingKind::Raster,
			_ => anyhow::bail!("unknown rendering kind '{s}', expected 'vector' or 'raster'"),
		})
	}
}

/// Renders one tile.
pub trait RenderingStrategy: Send + Sync {
	fn kind(&self) -> RenderingKind;

	/// The painted tile for `metadata`.
	///
	/// The tile carries the requested code and CRS. Failures are reported as
	/// a [`RenderError`] naming the layer and the tile.
	fn paint(&self, metadata: &TileMetadata, services: &RenderServices) -> Result<InternalTile>;
}

/// Runs `pipeline` for the layer of `metadata` on a fresh tile.
fn render_with_pipeline(pipeline: &str, metadata: &TileMetadata, services: &RenderServices) -> Result<InternalTile> {
	let mut tile = InternalTile::new(&metadata.layer_id, metadata.code, &metadata.crs);
	services
		.pipelines
		.execute_named(
			&PipelineName::from(pipeline),
			Some(&metadata.layer_id),
			metadata,
			&mut tile,
		)
		.map_err(|error| {
			if error.downcast_ref::<RenderError>().is_some() {
				error
			} else {
				error.context(RenderError::new(
					&metadata.layer_id,
					metadata.code,
					RenderErrorKind::Pipeline(pipeline.to_string()),
				))
			}
		})?;
	tile.code = metadata.code;
	tile.crs.clone_from(&metadata.crs);
	Ok(tile)
}

/// Paints SVG or VML with the `getVectorTile` pipeline.
pub struct VectorRenderingStrategy;

impl RenderingStrategy for VectorRenderingStrategy {
	fn kind(&self) -> RenderingKind {
		RenderingKind::Vector
	}

	fn paint(&self, metadata: &TileMetadata, services: &RenderServices) -> Result<InternalTile> {
		render_with_pipeline(VECTOR_TILE_PIPELINE, metadata, services)
	}
}

/// Paints a PNG image with the `getRasterTile` pipeline.
pub struct RasterRenderingStrategy;

impl RenderingStrategy for RasterRenderingStrategy {
	fn kind(&self) -> RenderingKind {
		RenderingKind::Raster
	}

	fn paint(&self, metadata: &TileMetadata, services: &RenderServices) -> Result<InternalTile> {
		render_with_pipeline(RASTER_TILE_PIPELINE, metadata, services)
	}
}
