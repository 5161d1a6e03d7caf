use super::LayerConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use tilepipe_geometry::{Geometry, parse_filter};
use tilepipe_render::LayerAuthorization;

fn default_true() -> bool {
	true
}

/// What may be seen of one layer.
///
/// Layers without an entry in the `security` section are not visible at all.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerSecurityConfig {
	#[serde(default = "default_true")]
	pub visible: bool,

	/// Filter expression every shown feature must satisfy
	#[serde(default)]
	pub feature_filter: Option<String>,

	/// Area in the layer CRS; defaults to the extent of the layer grid
	#[serde(default)]
	pub visible_area: Option<Geometry>,

	/// Show features that only partly lie in the visible area
	#[serde(default)]
	pub partly_visible_sufficient: bool,
}

impl Default for LayerSecurityConfig {
	fn default() -> Self {
		LayerSecurityConfig {
			visible: true,
			feature_filter: None,
			visible_area: None,
			partly_visible_sufficient: false,
		}
	}
}

impl LayerSecurityConfig {
	pub fn authorization(&self, layer: &LayerConfig) -> Result<LayerAuthorization> {
		let feature_filter = match &self.feature_filter {
			Some(expression) => Some(
				parse_filter(expression).with_context(|| format!("invalid feature filter for layer '{}'", layer.id))?,
			),
			None => None,
		};
		Ok(LayerAuthorization {
			visible: self.visible,
			feature_filter,
			visible_area: Some(
				self
					.visible_area
					.clone()
					.unwrap_or_else(|| Geometry::from_bbox(&layer.grid.extent)),
			),
			partly_visible_sufficient: self.partly_visible_sufficient,
		})
	}
}
