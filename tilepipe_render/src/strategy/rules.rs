use super::RenderingKind;
use serde::Deserialize;
use tilepipe_core::TileMetadata;

/// Decides whether a request is rendered with a particular strategy.
pub trait RenderingRule: Send + Sync {
	fn accept(&self, metadata: &TileMetadata) -> bool;

	/// The strategy used when the rule accepts.
	fn kind(&self) -> RenderingKind;
}

/// Accepts requests whose scale lies in `[min_scale, max_scale)`.
///
/// A missing bound is unbounded.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderBetweenScales {
	#[serde(default)]
	pub min_scale: Option<f64>,
	#[serde(default)]
	pub max_scale: Option<f64>,
	pub kind: RenderingKind,
}

impl RenderingRule for RenderBetweenScales {
	fn accept(&self, metadata: &TileMetadata) -> bool {
		self.min_scale.is_none_or(|min| metadata.scale >= min) && self.max_scale.is_none_or(|max| metadata.scale < max)
	}

	fn kind(&self) -> RenderingKind {
		self.kind
	}
}

/// Accepts requests for the listed layers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderForLayers {
	pub layers: Vec<String>,
	pub kind: RenderingKind,
}

impl RenderingRule for RenderForLayers {
	fn accept(&self, metadata: &TileMetadata) -> bool {
		self.layers.contains(&metadata.layer_id)
	}

	fn kind(&self) -> RenderingKind {
		self.kind
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use tilepipe_core::TileCode;

	fn metadata(layer_id: &str, scale: f64) -> TileMetadata {
		TileMetadata::new(layer_id, "EPSG:4326", TileCode::new(0, 0, 0).unwrap(), scale)
	}

	#[rstest]
	#[case(Some(1.0), Some(10.0), 0.5, false)]
	#[case(Some(1.0), Some(10.0), 1.0, true)]
	#[case(Some(1.0), Some(10.0), 9.99, true)]
	#[case(Some(1.0), Some(10.0), 10.0, false)]
	#[case(None, Some(10.0), 0.001, true)]
	#[case(Some(1.0), None, 1e9, true)]
	#[case(None, None, 3.0, true)]
	fn between_scales(
		#[case] min_scale: Option<f64>,
		#[case] max_scale: Option<f64>,
		#[case] scale: f64,
		#[case] expected: bool,
	) {
		let rule = RenderBetweenScales {
			min_scale,
			max_scale,
			kind: RenderingKind::Raster,
		};
		assert_eq!(rule.accept(&metadata("beans", scale)), expected);
		assert_eq!(rule.kind(), RenderingKind::Raster);
	}

	#[test]
	fn for_layers() {
		let rule = RenderForLayers {
			layers: vec!["beans".to_string(), "roads".to_string()],
			kind: RenderingKind::Raster,
		};
		assert!(rule.accept(&metadata("roads", 1.0)));
		assert!(!rule.accept(&metadata("rivers", 1.0)));
	}
}
