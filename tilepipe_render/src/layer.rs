use crate::InternalFeature;
use anyhow::{Context, Result, ensure};
use std::{collections::BTreeMap, sync::Arc};
use tilepipe_core::{FeatureInclude, FeatureIncludes, FeatureStyleInfo, NamedStyle, TileGrid};
use tilepipe_geometry::{AttributeValue, Crs, Feature, Filter, GeoService, parse_filter};

/// Static description of a vector layer.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorLayerInfo {
	pub id: String,
	/// CRS the features are stored in.
	pub crs: Crs,
	/// Filter expression always applied to the layer.
	pub default_filter: Option<String>,
	pub geometry_attribute: String,
	/// Tile grid in the layer CRS.
	pub grid: TileGrid,
}

/// A source of features.
pub trait VectorLayer: Send + Sync {
	fn info(&self) -> &VectorLayerInfo;

	/// Features matching `filter`, which is expressed in the layer CRS.
	///
	/// Geometries are returned in `crs`. Only the parts named in `includes`
	/// are filled in.
	fn get_features(
		&self,
		crs: Crs,
		filter: &Filter,
		style: &NamedStyle,
		includes: FeatureIncludes,
	) -> Result<Vec<InternalFeature>>;
}

/// All layers known to the renderer, by id.
#[derive(Default)]
pub struct LayerRegistry {
	layers: BTreeMap<String, Arc<dyn VectorLayer>>,
}

impl LayerRegistry {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, layer: Arc<dyn VectorLayer>) -> Result<()> {
		let id = layer.info().id.clone();
		ensure!(!self.layers.contains_key(&id), "layer '{id}' is defined twice");
		self.layers.insert(id, layer);
		Ok(())
	}

	#[must_use]
	pub fn get(&self, layer_id: &str) -> Option<Arc<dyn VectorLayer>> {
		self.layers.get(layer_id).cloned()
	}

	pub fn ids(&self) -> impl Iterator<Item = &str> {
		self.layers.keys().map(String::as_str)
	}
}

/// A layer holding its features in memory.
pub struct MemoryLayer {
	info: VectorLayerInfo,
	features: Vec<Feature>,
	geo: Arc<dyn GeoService>,
}

impl MemoryLayer {
	#[must_use]
	pub fn new(info: VectorLayerInfo, features: Vec<Feature>, geo: Arc<dyn GeoService>) -> Self {
		MemoryLayer { info, features, geo }
	}
}

fn label_text(value: &AttributeValue) -> String {
	match value {
		AttributeValue::String(text) => text.clone(),
		other => other.to_string(),
	}
}

impl VectorLayer for MemoryLayer {
	fn info(&self) -> &VectorLayerInfo {
		&self.info
	}

	fn get_features(
		&self,
		crs: Crs,
		filter: &Filter,
		style: &NamedStyle,
		includes: FeatureIncludes,
	) -> Result<Vec<InternalFeature>> {
		let formulas = style
			.feature_styles
			.iter()
			.map(|s| {
				let formula = match &s.formula {
					Some(expression) => parse_filter(expression)
						.with_context(|| format!("invalid formula of style '{}' in '{}'", s.name, style.name))?,
					None => Filter::Include,
				};
				Ok((formula, s))
			})
			.collect::<Result<Vec<(Filter, &FeatureStyleInfo)>>>()?;

		let mut result = Vec::new();
		for feature in self.features.iter().filter(|f| filter.evaluate(f)) {
			let mut internal = InternalFeature::new(&feature.id, &self.info.id);
			if includes.contains(FeatureInclude::Geometry)
				&& let Some(geometry) = &feature.geometry
			{
				match self.geo.transform(geometry, self.info.crs, crs) {
					Ok(geometry) => internal.geometry = Some(geometry),
					Err(error) => {
						log::warn!("skipping feature '{}' of layer '{}': {error}", feature.id, self.info.id);
						continue;
					}
				}
			}
			if includes.contains(FeatureInclude::Attributes) {
				internal.attributes = feature.attributes.clone();
			}
			if includes.contains(FeatureInclude::Style) {
				internal.style = formulas
					.iter()
					.find(|(formula, _)| formula.evaluate(feature))
					.map(|(_, s)| (*s).clone());
			}
			if includes.contains(FeatureInclude::Label)
				&& let Some(label_style) = &style.label_style
			{
				internal.label = feature.attributes.get_path(&label_style.attribute).map(label_text);
			}
			result.push(internal);
		}
		log::debug!(
			"layer '{}': {} of {} features match {filter}",
			self.info.id,
			result.len(),
			self.features.len()
		);
		Ok(result)
	}
}
