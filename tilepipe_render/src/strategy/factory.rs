use super::{RasterRenderingStrategy, RenderingKind, RenderingRule, RenderingStrategy, VectorRenderingStrategy};
use crate::{RenderError, RenderErrorKind};
use anyhow::Result;
use std::{collections::HashMap, sync::Arc};
use tilepipe_core::TileMetadata;

/// Picks the rendering strategy of a request.
///
/// Rules are evaluated in the order they were added and the first accepting
/// rule decides. Without an accepting rule the default kind is used.
pub struct RenderingStrategyFactory {
	rules: Vec<Box<dyn RenderingRule>>,
	default_kind: RenderingKind,
	strategies: HashMap<RenderingKind, Arc<dyn RenderingStrategy>>,
}

impl RenderingStrategyFactory {
	/// A factory without any strategy registered.
	#[must_use]
	pub fn new(default_kind: RenderingKind) -> Self {
		RenderingStrategyFactory {
			rules: Vec::new(),
			default_kind,
			strategies: HashMap::new(),
		}
	}

	/// A factory with the vector and raster strategies.
	#[must_use]
	pub fn standard(default_kind: RenderingKind) -> Self {
		Self::new(default_kind)
			.with_strategy(Arc::new(VectorRenderingStrategy))
			.with_strategy(Arc::new(RasterRenderingStrategy))
	}

	/// Registers `strategy` for its kind, replacing an earlier one.
	#[must_use]
	pub fn with_strategy(mut self, strategy: Arc<dyn RenderingStrategy>) -> Self {
		self.strategies.insert(strategy.kind(), strategy);
		self
	}

	#[must_use]
	pub fn with_rule(mut self, rule: impl RenderingRule + 'static) -> Self {
		self.rules.push(Box::new(rule));
		self
	}

	#[must_use]
	pub fn default_kind(&self) -> RenderingKind {
		self.default_kind
	}

	/// The kind chosen for `metadata`.
	#[must_use]
	pub fn kind_for(&self, metadata: &TileMetadata) -> RenderingKind {
		self
			.rules
			.iter()
			.find(|rule| rule.accept(metadata))
			.map_or(self.default_kind, |rule| rule.kind())
	}

	/// The strategy for `metadata`.
	///
	/// # Errors
	/// A [`RenderError`] if no strategy is registered for the chosen kind.
	pub fn strategy_for(&self, metadata: &TileMetadata) -> Result<Arc<dyn RenderingStrategy>> {
		let kind = self.kind_for(metadata);
		log::debug!("rendering tile {} of layer '{}' as {kind}", metadata.code, metadata.layer_id);
		self.strategies.get(&kind).cloned().ok_or_else(|| {
			RenderError::new(
				&metadata.layer_id,
				metadata.code,
				RenderErrorKind::NoStrategy(kind.to_string()),
			)
			.into()
		})
	}
}
