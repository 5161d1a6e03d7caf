use serde::Deserialize;
use std::sync::Arc;
use tilepipe_render::{MemoryTileCache, TileCache};

/// Rendered tile cache settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CacheConfig {
	pub enabled: bool,
	/// Maximum number of tiles held in memory.
	pub max_tiles: u64,
}

impl Default for CacheConfig {
	fn default() -> Self {
		CacheConfig {
			enabled: false,
			max_tiles: 10_000,
		}
	}
}

impl CacheConfig {
	#[must_use]
	pub fn build(&self) -> Option<Arc<dyn TileCache>> {
		if !self.enabled || self.max_tiles == 0 {
			return None;
		}
		log::debug!("caching up to {} rendered tiles", self.max_tiles);
		Some(Arc::new(MemoryTileCache::new(self.max_tiles)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn disabled_by_default() {
		assert!(CacheConfig::default().build().is_none());
	}

	#[test]
	fn parse() {
		let cache: CacheConfig = serde_yaml_ng::from_str("enabled: true").unwrap();
		assert_eq!(
			cache,
			CacheConfig {
				enabled: true,
				max_tiles: 10_000
			}
		);
		assert!(cache.build().is_some());

		let empty: CacheConfig = serde_yaml_ng::from_str("enabled: true\nmax_tiles: 0").unwrap();
		assert!(empty.build().is_none());
	}
}
