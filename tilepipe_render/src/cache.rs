use crate::{InternalTile, keys};
use anyhow::Result;
use moka::sync::Cache;
use std::{
	hash::{DefaultHasher, Hash, Hasher},
	sync::Arc,
};
use tilepipe_core::{TileMetadata, includes_to_bits};
use tilepipe_pipeline::{ExecutionMode, PipelineContext, PipelineInterceptor};

/// Storage for rendered tiles.
pub trait TileCache: Send + Sync {
	fn get(&self, key: &str) -> Option<Arc<InternalTile>>;

	fn put(&self, key: &str, tile: InternalTile);
}

/// Bounded in-memory [`TileCache`].
pub struct MemoryTileCache {
	cache: Cache<String, Arc<InternalTile>>,
}

impl MemoryTileCache {
	#[must_use]
	pub fn new(max_tiles: u64) -> Self {
		MemoryTileCache {
			cache: Cache::new(max_tiles),
		}
	}
}

impl TileCache for MemoryTileCache {
	fn get(&self, key: &str) -> Option<Arc<InternalTile>> {
		self.cache.get(key)
	}

	fn put(&self, key: &str, tile: InternalTile) {
		self.cache.insert(key.to_string(), Arc::new(tile));
	}
}

/// Skips fetching and painting when an equal tile was rendered before.
///
/// Tiles are equal when the request fields that shape the output match,
/// including the full style content, and the composed feature filter is the same. The interceptor must therefore
/// run after the filter steps.
pub struct TileCacheInterceptor {
	cache: Arc<dyn TileCache>,
	/// Distinguishes pipelines producing different content for the same request.
	variant: &'static str,
	from_step: &'static str,
}

impl TileCacheInterceptor {
	#[must_use]
	pub fn new(cache: Arc<dyn TileCache>, variant: &'static str, from_step: &'static str) -> Self {
		TileCacheInterceptor {
			cache,
			variant,
			from_step,
		}
	}

	fn cache_key(&self, metadata: &TileMetadata, context: &PipelineContext) -> Result<String> {
		let mut hasher = DefaultHasher::new();
		self.variant.hash(&mut hasher);
		metadata.layer_id.hash(&mut hasher);
		metadata.code.hash(&mut hasher);
		metadata.crs.hash(&mut hasher);
		metadata.scale.to_bits().hash(&mut hasher);
		metadata.pan_origin.map(f64::to_bits).hash(&mut hasher);
		metadata.style.hash(&mut hasher);
		metadata.renderer.hash(&mut hasher);
		metadata.paint_geometries.hash(&mut hasher);
		metadata.paint_labels.hash(&mut hasher);
		includes_to_bits(metadata.feature_includes).hash(&mut hasher);
		keys::filter(context)?.to_string().hash(&mut hasher);
		Ok(format!("{}/{}/{:016x}", metadata.layer_id, metadata.code, hasher.finish()))
	}
}

impl PipelineInterceptor<TileMetadata, InternalTile> for TileCacheInterceptor {
	fn id(&self) -> &str {
		"tile-cache"
	}

	fn from_step(&self) -> Option<&str> {
		Some(self.from_step)
	}

	fn before_steps(
		&self,
		request: &TileMetadata,
		context: &mut PipelineContext,
		response: &mut InternalTile,
	) -> Result<ExecutionMode> {
		let key = self.cache_key(request, context)?;
		let mode = if let Some(tile) = self.cache.get(&key) {
			log::debug!("tile cache hit for {key}");
			*response = InternalTile::clone(&tile);
			ExecutionMode::ExecuteNone
		} else {
			ExecutionMode::ExecuteAll
		};
		context.put(keys::CACHE_KEY_KEY, key);
		Ok(mode)
	}

	fn after_steps(
		&self,
		_request: &TileMetadata,
		context: &mut PipelineContext,
		response: &mut InternalTile,
	) -> Result<()> {
		if response.content.is_some()
			&& let Some(key) = keys::cache_key(context)?
		{
			self.cache.put(key, response.clone());
		}
		Ok(())
	}
}
