use super::{FeatureIncludes, TileCode};
use crate::NamedStyle;
use anyhow::{Result, bail};
use serde::Deserialize;
use std::{fmt, str::FromStr};

/// Vector markup a client can display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
	#[default]
	Svg,
	Vml,
}

impl fmt::Display for Renderer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Renderer::Svg => "SVG",
			Renderer::Vml => "VML",
		})
	}
}

impl FromStr for Renderer {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		Ok(match s.to_ascii_lowercase().as_str() {
			"svg" => Renderer::Svg,
			"vml" => Renderer::Vml,
			_ => bail!("unknown renderer '{s}', expected 'svg' or 'vml'"),
		})
	}
}

/// Everything a tile request asks for.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMetadata {
	pub layer_id: String,
	/// Identifier of the CRS the tile is requested in, e.g. `EPSG:3857`.
	pub crs: String,
	pub code: TileCode,
	/// Pixels per world unit.
	pub scale: f64,
	/// World position that maps to pixel `(0, 0)` of the map view.
	pub pan_origin: [f64; 2],
	pub style: NamedStyle,
	/// Optional filter expression narrowing the features of the tile.
	pub filter: Option<String>,
	pub renderer: Renderer,
	pub paint_geometries: bool,
	pub paint_labels: bool,
	pub feature_includes: FeatureIncludes,
}

impl TileMetadata {
	/// Metadata painting geometries only, with all feature parts included.
	#[must_use]
	pub fn new(layer_id: &str, crs: &str, code: TileCode, scale: f64) -> Self {
		TileMetadata {
			layer_id: layer_id.to_string(),
			crs: crs.to_string(),
			code,
			scale,
			pan_origin: [0.0, 0.0],
			style: NamedStyle::default(),
			filter: None,
			renderer: Renderer::Svg,
			paint_geometries: true,
			paint_labels: false,
			feature_includes: FeatureIncludes::all(),
		}
	}

	/// `true` if a tile produced for `other` already carries everything `self` asks for.
	///
	/// Both requests must address the same tile in the same way (layer, CRS,
	/// code, scale, pan origin, style, renderer) with the same filter.
	/// Painted geometries and labels requested by `self` must be requested by
	/// `other` as well, and `self`'s feature includes must be a subset of
	/// `other`'s.
	#[must_use]
	pub fn is_part_of(&self, other: &TileMetadata) -> bool {
		self.layer_id == other.layer_id
			&& self.crs == other.crs
			&& self.code == other.code
			&& self.scale == other.scale
			&& self.pan_origin == other.pan_origin
			&& self.style.name == other.style.name
			&& self.renderer == other.renderer
			&& self.filter == other.filter
			&& (!self.paint_geometries || other.paint_geometries)
			&& (!self.paint_labels || other.paint_labels)
			&& other.feature_includes.is_superset(self.feature_includes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::FeatureInclude;
	use rstest::rstest;

	fn metadata() -> TileMetadata {
		TileMetadata::new("beans", "EPSG:4326", TileCode::new(2, 1, 1).unwrap(), 2.0)
	}

	#[test]
	fn equal_metadata_is_part_of_itself() {
		assert!(metadata().is_part_of(&metadata()));
	}

	#[rstest]
	#[case(false, false, true, true, true)]
	#[case(true, false, true, true, true)]
	#[case(true, true, true, true, true)]
	#[case(true, true, true, false, false)]
	#[case(false, true, true, false, false)]
	fn flags_are_subsumed(
		#[case] geometries: bool,
		#[case] labels: bool,
		#[case] other_geometries: bool,
		#[case] other_labels: bool,
		#[case] expected: bool,
	) {
		let mut a = metadata();
		a.paint_geometries = geometries;
		a.paint_labels = labels;
		let mut b = metadata();
		b.paint_geometries = other_geometries;
		b.paint_labels = other_labels;
		assert_eq!(a.is_part_of(&b), expected);
	}

	#[test]
	fn includes_must_be_subset() {
		let mut a = metadata();
		a.feature_includes = FeatureInclude::Geometry.into();
		let mut b = metadata();
		b.feature_includes = FeatureInclude::Geometry | FeatureInclude::Style;
		assert!(a.is_part_of(&b));
		assert!(!b.is_part_of(&a));
	}

	#[test]
	fn filter_must_be_equal() {
		let mut a = metadata();
		a.filter = Some("a < 5".to_string());
		assert!(!a.is_part_of(&metadata()));
		assert!(!metadata().is_part_of(&a));
	}

	#[test]
	fn different_tiles_never_subsume() {
		let mut a = metadata();
		a.code = TileCode::new(2, 0, 1).unwrap();
		assert!(!a.is_part_of(&metadata()));
	}

	#[rstest]
	#[case("svg", Renderer::Svg)]
	#[case("SVG", Renderer::Svg)]
	#[case("vml", Renderer::Vml)]
	fn renderer_from_str(#[case] input: &str, #[case] expected: Renderer) {
		assert_eq!(input.parse::<Renderer>().unwrap(), expected);
	}

	#[test]
	fn renderer_unknown() {
		assert!("canvas".parse::<Renderer>().is_err());
	}
}
