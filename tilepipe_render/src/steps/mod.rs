//! Steps of the tile pipelines and the default pipeline definitions.

mod clip;
mod features;
mod layer_filter;
mod paint;
mod tile_filter;

pub use clip::TileClipStep;
pub use features::TileFeaturesStep;
pub use layer_filter::LayerFilterStep;
pub use paint::{TileImageStep, TilePaintStep};
pub use tile_filter::TileFilterStep;

use crate::{InternalTile, LayerRegistry, SecurityContext, TileCache, TileCacheInterceptor};
use anyhow::Result;
use std::sync::Arc;
use tilepipe_core::TileMetadata;
use tilepipe_geometry::{FilterService, GeoService};
use tilepipe_pipeline::{PipelineInfo, PipelineRegistry};

pub const VECTOR_TILE_PIPELINE: &str = "getVectorTile";
pub const RASTER_TILE_PIPELINE: &str = "getRasterTile";

pub const TILE_FILTER_STEP: &str = "tile-filter";
pub const LAYER_FILTER_STEP: &str = "layer-filter";
pub const TILE_FEATURES_STEP: &str = "tile-features";
pub const TILE_CLIP_STEP: &str = "tile-clip";
pub const TILE_PAINT_STEP: &str = "tile-paint";
pub const TILE_IMAGE_STEP: &str = "tile-image";

pub type TilePipeline = PipelineInfo<TileMetadata, InternalTile>;
pub type TilePipelineRegistry = PipelineRegistry<TileMetadata, InternalTile>;

/// Collaborators of the tile steps.
#[derive(Clone)]
pub struct TileServices {
	pub layers: Arc<LayerRegistry>,
	pub security: Arc<dyn SecurityContext>,
	pub filters: Arc<dyn FilterService>,
	pub geo: Arc<dyn GeoService>,
	pub cache: Option<Arc<dyn TileCache>>,
}

fn filter_steps(name: &str, services: &TileServices) -> TilePipeline {
	PipelineInfo::new(name)
		.with_step(TileFilterStep::new(
			Arc::clone(&services.layers),
			Arc::clone(&services.filters),
			Arc::clone(&services.geo),
		))
		.with_step(LayerFilterStep::new(
			Arc::clone(&services.security),
			Arc::clone(&services.filters),
		))
		.with_step(TileFeaturesStep)
		.with_step(TileClipStep)
}

/// `getVectorTile`: filter, fetch, clip and paint as SVG or VML.
#[must_use]
pub fn vector_tile_pipeline(services: &TileServices) -> TilePipeline {
	let mut pipeline = filter_steps(VECTOR_TILE_PIPELINE, services).with_step(TilePaintStep);
	if let Some(cache) = &services.cache {
		pipeline = pipeline.with_interceptor(TileCacheInterceptor::new(
			Arc::clone(cache),
			"vector",
			TILE_FEATURES_STEP,
		));
	}
	pipeline
}

/// `getRasterTile`: filter, fetch, clip and rasterize to PNG.
#[must_use]
pub fn raster_tile_pipeline(services: &TileServices) -> TilePipeline {
	let mut pipeline = filter_steps(RASTER_TILE_PIPELINE, services).with_step(TileImageStep);
	if let Some(cache) = &services.cache {
		pipeline = pipeline.with_interceptor(TileCacheInterceptor::new(
			Arc::clone(cache),
			"raster",
			TILE_FEATURES_STEP,
		));
	}
	pipeline
}

/// Registry holding the default vector and raster tile pipelines.
pub fn default_tile_pipelines(services: &TileServices) -> Result<TilePipelineRegistry> {
	let mut registry = PipelineRegistry::new();
	registry.register(vector_tile_pipeline(services))?;
	registry.register(raster_tile_pipeline(services))?;
	Ok(registry)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::beans_tile_services;
	use pretty_assertions::assert_eq;
	use tilepipe_pipeline::PipelineName;

	#[test]
	fn default_pipelines() {
		let registry = default_tile_pipelines(&beans_tile_services(false)).unwrap();
		let vector = registry.get(&PipelineName::from(VECTOR_TILE_PIPELINE), None).unwrap();
		assert_eq!(
			vector.step_ids(),
			["tile-filter", "layer-filter", "tile-features", "tile-clip", "tile-paint"]
		);
		let raster = registry.get(&PipelineName::from(RASTER_TILE_PIPELINE), None).unwrap();
		assert_eq!(raster.step_ids().last(), Some(&"tile-image"));
		assert!(raster.intercepted_ranges().unwrap().is_empty());
	}

	#[test]
	fn cache_wraps_fetching_and_painting() {
		let pipeline = vector_tile_pipeline(&beans_tile_services(true));
		let ranges = pipeline.intercepted_ranges().unwrap();
		assert_eq!(ranges.len(), 1);
		assert_eq!((ranges[0].first, ranges[0].last), (2, 4));
	}
}
