use super::{Filter, FilterParseError, SpatialOp, parse_filter};
use crate::Geometry;
use tilepipe_core::Bbox;

/// Builds filters for the tile pipeline steps.
pub trait FilterService: Send + Sync {
	fn parse_filter(&self, expression: &str) -> Result<Filter, FilterParseError>;

	/// Features whose geometry shares at least one point with `geometry`.
	fn create_intersects_filter(&self, geometry: &Geometry, geometry_attribute: &str) -> Filter;

	/// Features whose geometry lies completely inside `geometry`.
	fn create_within_filter(&self, geometry: &Geometry, geometry_attribute: &str) -> Filter;

	fn create_bbox_filter(&self, bbox: &Bbox, geometry_attribute: &str) -> Filter;

	fn create_false_filter(&self) -> Filter;

	fn create_true_filter(&self) -> Filter;

	fn create_and_filter(&self, left: Filter, right: Filter) -> Filter;
}

/// Stateless [`FilterService`] producing the simplified filter tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFilterService;

impl DefaultFilterService {
	fn spatial(op: SpatialOp, geometry: Geometry, attribute: &str) -> Filter {
		Filter::Spatial {
			op,
			attribute: attribute.to_string(),
			geometry,
		}
	}
}

impl FilterService for DefaultFilterService {
	fn parse_filter(&self, expression: &str) -> Result<Filter, FilterParseError> {
		log::trace!("parsing filter '{expression}'");
		parse_filter(expression)
	}

	fn create_intersects_filter(&self, geometry: &Geometry, geometry_attribute: &str) -> Filter {
		Self::spatial(SpatialOp::Intersects, geometry.clone(), geometry_attribute)
	}

	fn create_within_filter(&self, geometry: &Geometry, geometry_attribute: &str) -> Filter {
		Self::spatial(SpatialOp::Within, geometry.clone(), geometry_attribute)
	}

	fn create_bbox_filter(&self, bbox: &Bbox, geometry_attribute: &str) -> Filter {
		Self::spatial(SpatialOp::Bbox, Geometry::from_bbox(bbox), geometry_attribute)
	}

	fn create_false_filter(&self) -> Filter {
		Filter::Exclude
	}

	fn create_true_filter(&self) -> Filter {
		Filter::Include
	}

	fn create_and_filter(&self, left: Filter, right: Filter) -> Filter {
		left.and(right)
	}
}
