use super::TILE_CLIP_STEP;
use crate::InternalTile;
use anyhow::Result;
use tilepipe_core::TileMetadata;
use tilepipe_pipeline::{PipelineContext, PipelineStep};

/// Cuts geometries crossing the tile border to the tile bounds.
///
/// Features left without any part inside the tile are dropped.
pub struct TileClipStep;

impl PipelineStep<TileMetadata, InternalTile> for TileClipStep {
	fn id(&self) -> &str {
		TILE_CLIP_STEP
	}

	fn execute(&self, _request: &TileMetadata, _context: &mut PipelineContext, response: &mut InternalTile) -> Result<()> {
		let bounds = response.bounds;
		let code = response.code;
		let mut clipped = false;
		response.features.retain_mut(|feature| {
			let Some(geometry) = &feature.geometry else {
				return true;
			};
			match geometry.bounds() {
				Some(b) if bounds.contains(&b) => true,
				_ => match geometry.clip(&bounds) {
					Some(part) => {
						feature.clipped_geometry = Some(part);
						clipped = true;
						true
					}
					None => {
						log::trace!("feature '{}' lies outside tile {code}", feature.id);
						false
					}
				},
			}
		});
		response.clipped = clipped;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::InternalFeature;
	use approx::assert_relative_eq;
	use pretty_assertions::assert_eq;
	use tilepipe_core::{Bbox, TileCode};
	use tilepipe_geometry::{Geometry, GeometryType};

	fn tile(features: Vec<(&str, Geometry)>) -> InternalTile {
		let mut tile = InternalTile::new("beans", TileCode::new(1, 1, 0).unwrap(), "EPSG:4326");
		tile.bounds = Bbox::new(0.0, 0.0, 20.0, 20.0).unwrap();
		tile.features = features
			.into_iter()
			.map(|(id, geometry)| {
				let mut feature = InternalFeature::new(id, "beans");
				feature.geometry = Some(geometry);
				feature
			})
			.collect();
		tile
	}

	fn assert_bounds(geometry: &Geometry, expected: [f64; 4]) {
		let bounds = geometry.bounds().unwrap().as_array();
		for (value, expected) in bounds.into_iter().zip(expected) {
			assert_relative_eq!(value, expected, epsilon = 1e-9);
		}
	}

	fn run(tile: &mut InternalTile) {
		let metadata = TileMetadata::new("beans", "EPSG:4326", tile.code, 1.0);
		TileClipStep.execute(&metadata, &mut PipelineContext::new(), tile).unwrap();
	}

	#[test]
	fn inner_features_stay_untouched() {
		let mut tile = tile(vec![("p", Geometry::new_point([1.0, 1.0]))]);
		run(&mut tile);
		assert_eq!(tile.features.len(), 1);
		assert!(!tile.features[0].is_clipped());
		assert!(!tile.clipped);
	}

	#[test]
	fn crossing_features_are_clipped() {
		let mut tile = tile(vec![
			("line", Geometry::new_line_string(vec![[-10.0, 5.0], [10.0, 5.0]])),
			(
				"square",
				Geometry::new_polygon(vec![vec![[-5.0, -5.0], [5.0, -5.0], [5.0, 5.0], [-5.0, 5.0], [-5.0, -5.0]]]),
			),
			("outside", Geometry::new_point([-1.0, 1.0])),
		]);
		run(&mut tile);
		assert!(tile.clipped);
		let ids: Vec<&str> = tile.features.iter().map(|f| f.id.as_str()).collect();
		assert_eq!(ids, ["line", "square"]);
		assert_bounds(tile.features[0].display_geometry().unwrap(), [0.0, 5.0, 10.0, 5.0]);
		let square = tile.features[1].display_geometry().unwrap();
		assert_eq!(square.geometry_type(), GeometryType::Polygon);
		assert_bounds(square, [0.0, 0.0, 5.0, 5.0]);
	}
}
