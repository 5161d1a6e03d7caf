use super::TILE_FEATURES_STEP;
use crate::{InternalTile, keys};
use anyhow::Result;
use tilepipe_core::TileMetadata;
use tilepipe_pipeline::{PipelineContext, PipelineStep};

/// Fetches the features matching the composed filter from the layer.
pub struct TileFeaturesStep;

impl PipelineStep<TileMetadata, InternalTile> for TileFeaturesStep {
	fn id(&self) -> &str {
		TILE_FEATURES_STEP
	}

	fn execute(&self, request: &TileMetadata, context: &mut PipelineContext, response: &mut InternalTile) -> Result<()> {
		let layer = keys::layer(context)?;
		let filter = keys::filter(context)?;
		let features = layer.get_features(
			keys::crs(context)?,
			filter,
			&request.style,
			keys::feature_includes(context)?,
		)?;
		log::debug!(
			"tile {} of layer '{}': {} features",
			request.code,
			request.layer_id,
			features.len()
		);
		response.features = features;
		Ok(())
	}
}
