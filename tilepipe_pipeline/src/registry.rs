use crate::{PipelineInfo, PipelineName};
use anyhow::{Result, ensure};
use std::{collections::HashMap, fmt, sync::Arc};

/// Registry key: a pipeline name plus an optional layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineKey {
	pub name: PipelineName,
	pub layer_id: Option<String>,
}

impl PipelineKey {
	#[must_use]
	pub fn new(name: &PipelineName, layer_id: Option<&str>) -> Self {
		PipelineKey {
			name: name.clone(),
			layer_id: layer_id.map(str::to_string),
		}
	}
}

impl fmt::Display for PipelineKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.layer_id {
			Some(layer_id) => write!(f, "{}.{layer_id}", self.name),
			None => write!(f, "{}", self.name),
		}
	}
}

/// All known pipelines of one request/response type.
pub struct PipelineRegistry<Req, Resp> {
	pipelines: HashMap<PipelineKey, Arc<PipelineInfo<Req, Resp>>>,
}

impl<Req, Resp> Default for PipelineRegistry<Req, Resp> {
	fn default() -> Self {
		PipelineRegistry {
			pipelines: HashMap::new(),
		}
	}
}

impl<Req, Resp> PipelineRegistry<Req, Resp> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a pipeline under its name and layer.
	///
	/// Fails if a pipeline with the same key is already registered or the
	/// pipeline's interceptors do not resolve to valid step runs.
	pub fn register(&mut self, info: PipelineInfo<Req, Resp>) -> Result<()> {
		let key = PipelineKey::new(info.name(), info.layer_id());
		ensure!(
			!self.pipelines.contains_key(&key),
			"pipeline '{key}' is already registered"
		);
		info.intercepted_ranges()?;
		log::debug!("register pipeline {info:?}");
		self.pipelines.insert(key, Arc::new(info));
		Ok(())
	}

	#[must_use]
	pub fn get(&self, name: &PipelineName, layer_id: Option<&str>) -> Option<Arc<PipelineInfo<Req, Resp>>> {
		self.pipelines.get(&PipelineKey::new(name, layer_id)).cloned()
	}

	/// Registered keys in sorted order.
	#[must_use]
	pub fn keys(&self) -> Vec<&PipelineKey> {
		let mut keys: Vec<&PipelineKey> = self.pipelines.keys().collect();
		keys.sort();
		keys
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.pipelines.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.pipelines.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn register_and_get() {
		let mut registry = PipelineRegistry::<(), ()>::new();
		let name = PipelineName::new("getVectorTile");
		registry.register(PipelineInfo::new("getVectorTile")).unwrap();
		registry
			.register(PipelineInfo::new("getVectorTile").for_layer("beans"))
			.unwrap();
		assert!(registry.get(&name, None).is_some());
		assert_eq!(registry.get(&name, Some("beans")).unwrap().layer_id(), Some("beans"));
		assert!(registry.get(&name, Some("roads")).is_none());
		let keys: Vec<String> = registry.keys().iter().map(|k| k.to_string()).collect();
		assert_eq!(keys, ["getVectorTile", "getVectorTile.beans"]);
	}

	#[test]
	fn duplicates_are_rejected() {
		let mut registry = PipelineRegistry::<(), ()>::new();
		registry.register(PipelineInfo::new("a")).unwrap();
		let error = registry.register(PipelineInfo::new("a")).unwrap_err();
		assert_eq!(error.to_string(), "pipeline 'a' is already registered");
	}
}
