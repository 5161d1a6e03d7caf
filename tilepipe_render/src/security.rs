use std::collections::HashMap;
use tilepipe_geometry::{Filter, Geometry};

/// Answers what the current caller may see of each layer.
pub trait SecurityContext: Send + Sync {
	fn is_layer_visible(&self, layer_id: &str) -> bool;

	/// Filter every feature of the layer must additionally satisfy.
	fn feature_filter(&self, layer_id: &str) -> Option<Filter>;

	/// Area, in the layer CRS, outside of which no feature may be shown.
	/// `None` means nothing is visible.
	fn visible_area(&self, layer_id: &str) -> Option<Geometry>;

	/// `true` if a feature may be shown when it only partly lies in the visible area.
	fn is_partly_visible_sufficient(&self, layer_id: &str) -> bool;
}

/// What may be seen of one layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerAuthorization {
	pub visible: bool,
	pub feature_filter: Option<Filter>,
	pub visible_area: Option<Geometry>,
	pub partly_visible_sufficient: bool,
}

/// A fixed set of authorizations. Layers without one are invisible.
#[derive(Clone, Debug, Default)]
pub struct StaticSecurityContext {
	layers: HashMap<String, LayerAuthorization>,
}

impl StaticSecurityContext {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_layer(mut self, layer_id: &str, authorization: LayerAuthorization) -> Self {
		self.layers.insert(layer_id.to_string(), authorization);
		self
	}

	fn visible(&self, layer_id: &str) -> Option<&LayerAuthorization> {
		self.layers.get(layer_id).filter(|a| a.visible)
	}
}

impl SecurityContext for StaticSecurityContext {
	fn is_layer_visible(&self, layer_id: &str) -> bool {
		self.visible(layer_id).is_some()
	}

	fn feature_filter(&self, layer_id: &str) -> Option<Filter> {
		self.visible(layer_id)?.feature_filter.clone()
	}

	fn visible_area(&self, layer_id: &str) -> Option<Geometry> {
		self.visible(layer_id)?.visible_area.clone()
	}

	fn is_partly_visible_sufficient(&self, layer_id: &str) -> bool {
		self.visible(layer_id).is_some_and(|a| a.partly_visible_sufficient)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_and_hidden_layers_see_nothing() {
		let security = StaticSecurityContext::new().with_layer(
			"hidden",
			LayerAuthorization {
				visible: false,
				visible_area: Some(Geometry::new_point([0.0, 0.0])),
				partly_visible_sufficient: true,
				..LayerAuthorization::default()
			},
		);
		for layer_id in ["hidden", "unknown"] {
			assert!(!security.is_layer_visible(layer_id));
			assert!(security.visible_area(layer_id).is_none());
			assert!(security.feature_filter(layer_id).is_none());
			assert!(!security.is_partly_visible_sufficient(layer_id));
		}
	}

	#[test]
	fn visible_layer() {
		let security = StaticSecurityContext::new().with_layer(
			"beans",
			LayerAuthorization {
				visible: true,
				feature_filter: Some(Filter::Exclude),
				visible_area: Some(Geometry::new_point([0.0, 0.0])),
				partly_visible_sufficient: false,
			},
		);
		assert!(security.is_layer_visible("beans"));
		assert_eq!(security.feature_filter("beans"), Some(Filter::Exclude));
		assert!(security.visible_area("beans").is_some());
		assert!(!security.is_partly_visible_sufficient("beans"));
	}
}
