use super::TILE_FILTER_STEP;
use crate::{InternalTile, LayerRegistry, RenderError, RenderErrorKind, keys};
use anyhow::{Context, Result, ensure};
use std::sync::Arc;
use tilepipe_core::{FeatureInclude, TileMetadata};
use tilepipe_geometry::{Crs, FilterService, GeoService};
use tilepipe_pipeline::{PipelineContext, PipelineStep};

/// Largest tile edge in pixels.
const MAX_TILE_SIZE: f64 = 4096.0;

/// First step of the tile pipelines.
///
/// Resolves the layer, computes the tile area and size and starts the
/// feature filter with the tile bounding box and the request filter. A
/// request filter that does not parse fails the pipeline.
pub struct TileFilterStep {
	layers: Arc<LayerRegistry>,
	filters: Arc<dyn FilterService>,
	geo: Arc<dyn GeoService>,
}

impl TileFilterStep {
	#[must_use]
	pub fn new(layers: Arc<LayerRegistry>, filters: Arc<dyn FilterService>, geo: Arc<dyn GeoService>) -> Self {
		TileFilterStep { layers, filters, geo }
	}
}

impl PipelineStep<TileMetadata, InternalTile> for TileFilterStep {
	fn id(&self) -> &str {
		TILE_FILTER_STEP
	}

	fn execute(&self, request: &TileMetadata, context: &mut PipelineContext, response: &mut InternalTile) -> Result<()> {
		let layer = self
			.layers
			.get(&request.layer_id)
			.with_context(|| format!("unknown layer '{}'", request.layer_id))?;
		let info = layer.info();
		let crs: Crs = request.crs.parse()?;
		ensure!(
			request.scale.is_finite() && request.scale > 0.0,
			"scale must be a positive number, got {}",
			request.scale
		);

		let layer_bounds = info.grid.tile_bounds(&request.code);
		let bounds = self
			.geo
			.transform_bbox(&layer_bounds, info.crs, crs)
			.map_err(|e| RenderError::new(&info.id, request.code, RenderErrorKind::Transform(e.to_string())))?;
		let width = (bounds.width() * request.scale).round();
		let height = (bounds.height() * request.scale).round();
		ensure!(
			(1.0..=MAX_TILE_SIZE).contains(&width) && (1.0..=MAX_TILE_SIZE).contains(&height),
			"tile {} of layer '{}' would be {width} x {height} pixels at scale {}",
			request.code,
			info.id,
			request.scale
		);

		let mut filter = self.filters.create_bbox_filter(&layer_bounds, &info.geometry_attribute);
		if let Some(expression) = &request.filter {
			let request_filter = self
				.filters
				.parse_filter(expression)
				.with_context(|| format!("invalid filter in tile request for layer '{}'", info.id))?;
			filter = self.filters.create_and_filter(filter, request_filter);
		}

		let mut includes = request.feature_includes;
		if request.paint_geometries {
			includes.insert(FeatureInclude::Geometry);
			includes.insert(FeatureInclude::Style);
		}
		if request.paint_labels {
			includes.insert(FeatureInclude::Label);
		}

		context.put(keys::LAYER_ID_KEY, info.id.clone());
		context.put(keys::CRS_KEY, crs);
		context.put(keys::TILE_BOUNDS_KEY, layer_bounds);
		context.put(keys::FEATURE_INCLUDES_KEY, includes);
		context.put(keys::FILTER_KEY, filter);
		context.put(keys::LAYER_KEY, Arc::clone(&layer));

		response.code = request.code;
		response.crs.clone_from(&request.crs);
		response.bounds = bounds;
		response.screen_width = width as u32;
		response.screen_height = height as u32;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{beans_layer, beans_metadata};
	use approx::assert_relative_eq;
	use pretty_assertions::assert_eq;
	use tilepipe_core::{Bbox, TileCode};
	use tilepipe_geometry::{DefaultFilterService, DefaultGeoService};

	fn step() -> TileFilterStep {
		let mut layers = LayerRegistry::new();
		layers.add(Arc::new(beans_layer())).unwrap();
		TileFilterStep::new(Arc::new(layers), Arc::new(DefaultFilterService), Arc::new(DefaultGeoService))
	}

	fn run(metadata: &TileMetadata) -> Result<(PipelineContext, InternalTile)> {
		let mut context = PipelineContext::new();
		let mut tile = InternalTile::new(&metadata.layer_id, metadata.code, &metadata.crs);
		step().execute(metadata, &mut context, &mut tile)?;
		Ok((context, tile))
	}

	#[test]
	fn seeds_context_and_tile() {
		let mut metadata = beans_metadata();
		metadata.code = TileCode::new(1, 1, 0).unwrap();
		metadata.filter = Some("size < 10".to_string());
		let (context, tile) = run(&metadata).unwrap();
		assert_eq!(keys::layer_id(&context).unwrap(), "beans");
		assert_eq!(keys::crs(&context).unwrap(), Crs::Wgs84);
		assert_eq!(keys::tile_bounds(&context).unwrap(), Bbox::new(0.0, 0.0, 20.0, 20.0).unwrap());
		assert_eq!(
			keys::filter(&context).unwrap().to_string(),
			"BBOX(the_geom, 0, 0, 20, 20) AND size < 10"
		);
		assert!(keys::feature_includes(&context).unwrap().contains(FeatureInclude::Style));
		assert_eq!((tile.screen_width, tile.screen_height), (200, 200));
		assert_eq!(tile.bounds, Bbox::new(0.0, 0.0, 20.0, 20.0).unwrap());
	}

	#[test]
	fn bounds_follow_the_request_crs() {
		let mut metadata = beans_metadata();
		metadata.crs = "EPSG:3857".to_string();
		metadata.scale = 0.0001;
		let (_, tile) = run(&metadata).unwrap();
		assert_relative_eq!(tile.bounds.x_max, 2_226_389.8, epsilon = 0.1);
		assert_eq!(tile.screen_width, 445);
	}

	#[test]
	fn malformed_request_filter_is_fatal() {
		let mut metadata = beans_metadata();
		metadata.filter = Some("size <".to_string());
		let error = run(&metadata).unwrap_err();
		assert!(error.to_string().contains("invalid filter in tile request"));
	}

	#[test]
	fn unknown_layer_and_crs() {
		let mut metadata = beans_metadata();
		metadata.layer_id = "roads".to_string();
		assert_eq!(run(&metadata).unwrap_err().to_string(), "unknown layer 'roads'");
		let mut metadata = beans_metadata();
		metadata.crs = "EPSG:31370".to_string();
		assert!(run(&metadata).is_err());
	}

	#[test]
	fn oversized_tiles_are_rejected() {
		let mut metadata = beans_metadata();
		metadata.scale = 1000.0;
		assert!(run(&metadata).unwrap_err().to_string().contains("pixels"));
	}
}
