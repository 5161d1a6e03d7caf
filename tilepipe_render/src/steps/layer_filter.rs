use super::LAYER_FILTER_STEP;
use crate::{InternalTile, SecurityContext, keys};
use anyhow::Result;
use std::sync::Arc;
use tilepipe_core::TileMetadata;
use tilepipe_geometry::{Filter, FilterService};
use tilepipe_pipeline::{PipelineContext, PipelineStep};

/// Restricts the feature filter to what the caller may see.
///
/// The filter in the context is combined with the security feature filter,
/// the default filter of the layer and a spatial test against the visible
/// area. Without a visible area every feature is excluded.
pub struct LayerFilterStep {
	security: Arc<dyn SecurityContext>,
	filters: Arc<dyn FilterService>,
}

impl LayerFilterStep {
	#[must_use]
	pub fn new(security: Arc<dyn SecurityContext>, filters: Arc<dyn FilterService>) -> Self {
		LayerFilterStep { security, filters }
	}

	/// Composed filter for `layer_id`, starting from `filter`.
	pub fn compose(
		&self,
		layer_id: &str,
		default_filter: Option<&str>,
		geometry_attribute: &str,
		filter: Filter,
	) -> Filter {
		let Some(visible_area) = self.security.visible_area(layer_id) else {
			log::debug!("layer '{layer_id}' has no visible area, excluding all features");
			return self.filters.create_false_filter();
		};

		let mut filter = filter;
		if let Some(security_filter) = self.security.feature_filter(layer_id) {
			filter = self.filters.create_and_filter(filter, security_filter);
		}
		if let Some(expression) = default_filter {
			let default = self.filters.parse_filter(expression).unwrap_or_else(|error| {
				log::warn!("ignoring default filter of layer '{layer_id}': {error}");
				self.filters.create_true_filter()
			});
			filter = self.filters.create_and_filter(filter, default);
		}
		let area_filter = if self.security.is_partly_visible_sufficient(layer_id) {
			self.filters.create_intersects_filter(&visible_area, geometry_attribute)
		} else {
			self.filters.create_within_filter(&visible_area, geometry_attribute)
		};
		self.filters.create_and_filter(filter, area_filter)
	}
}

impl PipelineStep<TileMetadata, InternalTile> for LayerFilterStep {
	fn id(&self) -> &str {
		LAYER_FILTER_STEP
	}

	fn execute(&self, _request: &TileMetadata, context: &mut PipelineContext, _response: &mut InternalTile) -> Result<()> {
		let layer = keys::layer(context)?;
		let info = layer.info();
		let incoming = keys::optional_filter(context)?
			.cloned()
			.unwrap_or_else(|| self.filters.create_true_filter());
		let filter = self.compose(
			keys::layer_id(context)?,
			info.default_filter.as_deref(),
			&info.geometry_attribute,
			incoming,
		);
		context.put(keys::FILTER_KEY, filter);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{beans_layer, beans_metadata, full_extent};
	use crate::{LayerAuthorization, StaticSecurityContext, VectorLayer};
	use pretty_assertions::assert_eq;
	use rstest::rstest;
	use tilepipe_core::Bbox;
	use tilepipe_geometry::{AttributeValue, Attributes, DefaultFilterService, Feature, Geometry, parse_filter};

	fn step(authorization: LayerAuthorization) -> LayerFilterStep {
		LayerFilterStep::new(
			Arc::new(StaticSecurityContext::new().with_layer("beans", authorization)),
			Arc::new(DefaultFilterService),
		)
	}

	fn feature(b: i64, x: f64) -> Feature {
		let inner = Attributes::from(vec![("b", AttributeValue::Int(b))]);
		let attributes = Attributes::from(vec![("a", AttributeValue::Object(inner))]);
		Feature::new("f", attributes, Some(Geometry::new_line_string(vec![[x, 0.0], [x + 10.0, 0.0]])))
	}

	#[rstest]
	#[case(None, None)]
	#[case(Some("a.b < 5"), None)]
	#[case(None, Some(Filter::Include))]
	#[case(Some("a.b < 5"), Some(parse_filter("a.b > 1").unwrap()))]
	fn no_visible_area_excludes_everything(#[case] default_filter: Option<&str>, #[case] security: Option<Filter>) {
		let step = step(LayerAuthorization {
			visible: true,
			feature_filter: security,
			visible_area: None,
			partly_visible_sufficient: true,
		});
		for incoming in [Filter::Include, parse_filter("a.b = 3").unwrap()] {
			let filter = step.compose("beans", default_filter, "the_geom", incoming);
			assert_eq!(filter, Filter::Exclude);
			assert!(!filter.evaluate(&feature(3, 0.0)));
		}
	}

	#[test]
	fn default_filter_and_full_extent() {
		let step = step(LayerAuthorization {
			visible: true,
			feature_filter: None,
			visible_area: Some(full_extent()),
			partly_visible_sufficient: true,
		});
		let filter = step.compose("beans", Some("a.b < 5"), "the_geom", Filter::Include);
		assert!(
			filter
				.to_string()
				.starts_with("a.b < 5 AND INTERSECTS(the_geom, POLYGON ((")
		);
		assert!(filter.evaluate(&feature(3, 0.0)));
		assert!(!filter.evaluate(&feature(10, 0.0)));
	}

	#[rstest]
	#[case(true, 3, 0.0, true)]
	#[case(true, 3, 15.0, true)]
	#[case(true, 3, 30.0, false)]
	#[case(false, 3, 0.0, true)]
	#[case(false, 3, 15.0, false)]
	#[case(true, 1, 0.0, false)]
	#[case(true, 5, 0.0, false)]
	fn security_default_and_area(
		#[case] partly: bool,
		#[case] b: i64,
		#[case] x: f64,
		#[case] expected: bool,
	) {
		let step = step(LayerAuthorization {
			visible: true,
			feature_filter: Some(parse_filter("a.b > 2").unwrap()),
			visible_area: Some(full_extent()),
			partly_visible_sufficient: partly,
		});
		let filter = step.compose("beans", Some("a.b < 5"), "the_geom", Filter::Include);
		assert_eq!(filter.evaluate(&feature(b, x)), expected);
	}

	#[test]
	fn malformed_default_filter_is_ignored() {
		let step = step(LayerAuthorization {
			visible: true,
			feature_filter: None,
			visible_area: Some(full_extent()),
			partly_visible_sufficient: false,
		});
		let filter = step.compose("beans", Some("a.b <"), "the_geom", Filter::Include);
		assert!(filter.to_string().starts_with("WITHIN(the_geom, POLYGON"));
		assert!(filter.evaluate(&feature(100, 0.0)));
	}

	#[test]
	fn execute_extends_the_context_filter() {
		let step = step(LayerAuthorization {
			visible: true,
			feature_filter: Some(parse_filter("size > 1").unwrap()),
			visible_area: Some(Geometry::from_bbox(&Bbox::new(0.0, 0.0, 1.0, 1.0).unwrap())),
			partly_visible_sufficient: true,
		});
		let layer: Arc<dyn VectorLayer> = Arc::new(beans_layer());
		let mut context = PipelineContext::new();
		context.put(keys::LAYER_ID_KEY, "beans".to_string());
		context.put(keys::LAYER_KEY, layer);
		context.put(keys::FILTER_KEY, parse_filter("size < 10").unwrap());
		let metadata = beans_metadata();
		let mut tile = InternalTile::new("beans", metadata.code, &metadata.crs);
		step.execute(&metadata, &mut context, &mut tile).unwrap();

		let filter = keys::filter(&context).unwrap();
		assert!(
			filter
				.to_string()
				.starts_with("size < 10 AND size > 1 AND INTERSECTS(the_geom, ")
		);
	}

	#[test]
	fn execute_requires_the_layer() {
		let step = step(LayerAuthorization::default());
		let metadata = beans_metadata();
		let mut tile = InternalTile::new("beans", metadata.code, &metadata.crs);
		assert!(step.execute(&metadata, &mut PipelineContext::new(), &mut tile).is_err());
	}
}
