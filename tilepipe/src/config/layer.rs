use anyhow::{Context, Result, bail, ensure};
use serde::Deserialize;
use std::sync::Arc;
use tilepipe_core::{NamedStyle, TileGrid};
use tilepipe_geometry::{Crs, Feature, GeoService};
use tilepipe_render::{MemoryLayer, VectorLayerInfo};

fn default_crs() -> String {
	String::from("EPSG:4326")
}

fn default_geometry_attribute() -> String {
	String::from("the_geom")
}

/// A layer holding its features inline.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
	pub id: String,

	/// CRS of the features and the grid, e.g. `EPSG:4326`
	#[serde(default = "default_crs")]
	pub crs: String,

	/// Filter expression every feature of the layer must satisfy
	#[serde(default)]
	pub default_filter: Option<String>,

	#[serde(default = "default_geometry_attribute")]
	pub geometry_attribute: String,

	pub grid: TileGrid,

	/// Named styles; the first one is used when a request names none
	#[serde(default)]
	pub styles: Vec<NamedStyle>,

	#[serde(default)]
	pub features: Vec<Feature>,
}

impl LayerConfig {
	pub fn crs(&self) -> Result<Crs> {
		self
			.crs
			.parse()
			.with_context(|| format!("invalid crs of layer '{}'", self.id))
	}

	pub fn info(&self) -> Result<VectorLayerInfo> {
		ensure!(!self.id.is_empty(), "layer id must not be empty");
		Ok(VectorLayerInfo {
			id: self.id.clone(),
			crs: self.crs()?,
			default_filter: self.default_filter.clone(),
			geometry_attribute: self.geometry_attribute.clone(),
			grid: self.grid.clone(),
		})
	}

	pub fn build(&self, geo: Arc<dyn GeoService>) -> Result<MemoryLayer> {
		Ok(MemoryLayer::new(self.info()?, self.features.clone(), geo))
	}

	/// The style called `name`, or the first style if `name` is `None`.
	///
	/// A layer without styles paints everything with the default feature style.
	pub fn style(&self, name: Option<&str>) -> Result<NamedStyle> {
		match name {
			Some(name) => match self.styles.iter().find(|s| s.name == name) {
				Some(style) => Ok(style.clone()),
				None => bail!("layer '{}' has no style '{name}'", self.id),
			},
			None => Ok(self
				.styles
				.first()
				.cloned()
				.unwrap_or_else(|| NamedStyle::new(&self.id, Vec::new()))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use tilepipe_core::{Bbox, FeatureIncludes};
	use tilepipe_geometry::{DefaultGeoService, Filter, Geometry};
	use tilepipe_render::VectorLayer;

	const YAML: &str = r##"
id: roads
crs: EPSG:3857
grid:
  extent: [0, 0, 1000, 1000]
  tile_width: 512
styles:
  - name: plain
  - name: red
    feature_styles:
      - fill_color: "#ff0000"
features:
  - id: a
    attributes: { kind: highway }
    geometry: { type: LineString, coordinates: [[0, 0], [100, 100]] }
"##;

	fn layer() -> LayerConfig {
		serde_yaml_ng::from_str(YAML).unwrap()
	}

	#[test]
	fn parse_with_defaults() {
		let layer = layer();
		assert_eq!(layer.geometry_attribute, "the_geom");
		assert_eq!(layer.default_filter, None);
		assert_eq!(layer.grid.extent, Bbox::new(0.0, 0.0, 1000.0, 1000.0).unwrap());
		assert_eq!((layer.grid.tile_width, layer.grid.tile_height), (512, 256));
		assert_eq!(
			layer.features[0].geometry,
			Some(Geometry::new_line_string(vec![[0.0, 0.0], [100.0, 100.0]]))
		);

		let info = layer.info().unwrap();
		assert_eq!(info.crs, Crs::WebMercator);
	}

	#[test]
	fn styles() {
		let layer = layer();
		assert_eq!(layer.style(None).unwrap().name, "plain");
		assert_eq!(layer.style(Some("red")).unwrap().feature_styles.len(), 1);
		assert_eq!(
			layer.style(Some("blue")).unwrap_err().to_string(),
			"layer 'roads' has no style 'blue'"
		);

		let bare = LayerConfig {
			styles: Vec::new(),
			..layer
		};
		assert_eq!(bare.style(None).unwrap(), NamedStyle::new("roads", Vec::new()));
	}

	#[test]
	fn invalid_crs() {
		let layer = LayerConfig {
			crs: "EPSG:31467".to_string(),
			..layer()
		};
		assert_eq!(layer.info().unwrap_err().to_string(), "invalid crs of layer 'roads'");
	}

	#[test]
	fn build_memory_layer() {
		let layer = layer().build(Arc::new(DefaultGeoService)).unwrap();
		assert_eq!(layer.info().id, "roads");
		let features = layer
			.get_features(
				Crs::WebMercator,
				&Filter::Include,
				&NamedStyle::default(),
				FeatureIncludes::all(),
			)
			.unwrap();
		assert_eq!(features.len(), 1);
	}

	#[test]
	fn unknown_fields_are_rejected() {
		assert!(serde_yaml_ng::from_str::<LayerConfig>("id: x\ngrid: { extent: [0, 0, 1, 1] }\ncolour: red").is_err());
	}
}
