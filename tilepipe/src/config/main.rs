use super::{CacheConfig, LayerConfig, LayerSecurityConfig, RenderingConfig};
use crate::command::CommandServices;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	collections::BTreeMap,
	fs::File,
	io::{BufReader, Read},
	path::Path,
	sync::Arc,
};
use tilepipe_geometry::{DefaultFilterService, DefaultGeoService, GeoService};
use tilepipe_pipeline::PipelineService;
use tilepipe_render::{
	LayerRegistry, StaticSecurityContext,
	steps::{TileServices, default_tile_pipelines},
	strategy::RenderServices,
};

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// Layers that can be rendered
	#[serde(default)]
	pub layers: Vec<LayerConfig>,

	/// Authorizations by layer id. Layers without an entry are not visible.
	#[serde(default)]
	pub security: BTreeMap<String, LayerSecurityConfig>,

	#[serde(default)]
	pub rendering: RenderingConfig,

	#[serde(default)]
	pub cache: CacheConfig,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("can not open config {path:?}"))?;
		Config::from_reader(BufReader::new(file)).with_context(|| format!("can not parse config {path:?}"))
	}

	pub fn layer(&self, layer_id: &str) -> Result<&LayerConfig> {
		self
			.layers
			.iter()
			.find(|layer| layer.id == layer_id)
			.with_context(|| format!("unknown layer '{layer_id}'"))
	}

	pub fn security_context(&self) -> Result<StaticSecurityContext> {
		let mut context = StaticSecurityContext::new();
		for (layer_id, security) in &self.security {
			let layer = self
				.layer(layer_id)
				.context("security is configured for a layer that does not exist")?;
			context = context.with_layer(layer_id, security.authorization(layer)?);
		}
		Ok(context)
	}

	/// Builds layers, security, pipelines and strategies.
	pub fn build_services(&self) -> Result<CommandServices> {
		let geo: Arc<dyn GeoService> = Arc::new(DefaultGeoService);
		let mut layers = LayerRegistry::new();
		for layer in &self.layers {
			layers.add(Arc::new(layer.build(Arc::clone(&geo))?))?;
		}
		for layer in self.layers.iter().filter(|l| !self.security.contains_key(&l.id)) {
			log::warn!("layer '{}' has no security entry and will not be visible", layer.id);
		}

		let tile_services = TileServices {
			layers: Arc::new(layers),
			security: Arc::new(self.security_context()?),
			filters: Arc::new(DefaultFilterService),
			geo,
			cache: self.cache.build(),
		};
		let pipelines = default_tile_pipelines(&tile_services)?;
		log::debug!(
			"built services for {} layers, rendering {} by default",
			self.layers.len(),
			self.rendering.default
		);

		Ok(CommandServices {
			render: RenderServices {
				pipelines: PipelineService::new(Arc::new(pipelines)),
				layers: tile_services.layers,
				security: tile_services.security,
			},
			strategies: Arc::new(self.rendering.build()),
		})
	}
}
