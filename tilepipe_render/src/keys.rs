//! Well-known keys of the tile pipeline context and typed accessors for them.
//!
//! Steps never call [`PipelineContext::get`] with a raw key; they use the
//! functions in this module so that the expected type of every key lives in
//! one place.

use crate::VectorLayer;
use std::sync::Arc;
use tilepipe_core::{Bbox, FeatureIncludes};
use tilepipe_geometry::{Crs, Filter};
use tilepipe_pipeline::{ContextError, PipelineContext};

/// `String`, id of the requested layer.
pub const LAYER_ID_KEY: &str = "layerId";
/// `Arc<dyn VectorLayer>`, the requested layer.
pub const LAYER_KEY: &str = "layer";
/// [`Filter`], the feature filter composed so far.
pub const FILTER_KEY: &str = "filter";
/// [`Crs`] of the request.
pub const CRS_KEY: &str = "crs";
/// [`Bbox`] of the tile in the layer CRS.
pub const TILE_BOUNDS_KEY: &str = "tileBounds";
/// [`FeatureIncludes`] the features are fetched with.
pub const FEATURE_INCLUDES_KEY: &str = "featureIncludes";
/// `String`, cache key of the tile.
pub const CACHE_KEY_KEY: &str = "cacheKey";

pub fn layer_id(context: &PipelineContext) -> Result<&str, ContextError> {
	context.get::<String>(LAYER_ID_KEY).map(String::as_str)
}

pub fn layer(context: &PipelineContext) -> Result<Arc<dyn VectorLayer>, ContextError> {
	context.get::<Arc<dyn VectorLayer>>(LAYER_KEY).cloned()
}

pub fn filter(context: &PipelineContext) -> Result<&Filter, ContextError> {
	context.get::<Filter>(FILTER_KEY)
}

pub fn optional_filter(context: &PipelineContext) -> Result<Option<&Filter>, ContextError> {
	context.get_optional::<Filter>(FILTER_KEY)
}

pub fn crs(context: &PipelineContext) -> Result<Crs, ContextError> {
	context.get::<Crs>(CRS_KEY).copied()
}

pub fn tile_bounds(context: &PipelineContext) -> Result<Bbox, ContextError> {
	context.get::<Bbox>(TILE_BOUNDS_KEY).copied()
}

pub fn feature_includes(context: &PipelineContext) -> Result<FeatureIncludes, ContextError> {
	context.get::<FeatureIncludes>(FEATURE_INCLUDES_KEY).copied()
}

pub fn cache_key(context: &PipelineContext) -> Result<Option<&str>, ContextError> {
	Ok(context.get_optional::<String>(CACHE_KEY_KEY)?.map(String::as_str))
}
