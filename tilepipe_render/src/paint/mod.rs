//! Painters turning the features of a tile into SVG, VML or a raster image.
//!
//! All painters first move the display geometry of every feature into tile
//! pixel space with a [`DisplayTransform`]. A feature whose geometry can not
//! be transformed is logged and left out; every other feature is painted.

mod raster;
mod svg;
mod vml;

pub use raster::TileImageCreator;
pub use svg::SvgTilePainter;
pub use vml::VmlTilePainter;

use crate::{InternalFeature, InternalTile, RenderError, RenderErrorKind};
use anyhow::{Result, ensure};
use std::borrow::Cow;
use tilepipe_core::{Bbox, FeatureStyleInfo, TileMetadata};
use tilepipe_geometry::{Coord, Geometry, GeometryType, LineString, Polygon};

/// Writes the painted content of a tile.
pub trait TilePainter: Send + Sync {
	/// Sets `tile.content` from the features of `tile`. Features are not modified.
	fn paint(&self, tile: &mut InternalTile, metadata: &TileMetadata) -> Result<()>;
}

/// Maps world coordinates in the request CRS to pixels of one tile.
///
/// `px = (x - pan_x) * scale - offset_x`, `py = (pan_y - y) * scale - offset_y`,
/// where the offset is the top left corner of the tile in the same pixel
/// space, rounded so that neighbouring tiles share their borders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayTransform {
	scale: f64,
	pan: [f64; 2],
	offset: [f64; 2],
}

impl DisplayTransform {
	#[must_use]
	pub fn new(bounds: &Bbox, scale: f64, pan_origin: [f64; 2]) -> Self {
		let [pan_x, pan_y] = pan_origin;
		DisplayTransform {
			scale,
			pan: pan_origin,
			offset: [
				((bounds.x_min - pan_x) * scale).round(),
				((pan_y - bounds.y_max) * scale).round(),
			],
		}
	}

	#[must_use]
	pub fn for_tile(tile: &InternalTile, metadata: &TileMetadata) -> Self {
		Self::new(&tile.bounds, metadata.scale, metadata.pan_origin)
	}

	pub fn apply_coord(&self, x: f64, y: f64) -> Result<[f64; 2]> {
		let px = (x - self.pan[0]) * self.scale - self.offset[0];
		let py = (self.pan[1] - y) * self.scale - self.offset[1];
		ensure!(px.is_finite() && py.is_finite(), "coordinate ({x}, {y}) can not be displayed");
		Ok([px, py])
	}

	pub fn apply(&self, geometry: &Geometry) -> Result<Geometry> {
		geometry.try_map_coords(|c| {
			let [x, y] = self.apply_coord(c.x, c.y)?;
			Ok(Coord { x, y })
		})
	}
}

/// A feature ready to be written, with its geometry in tile pixels.
pub(crate) struct DisplayFeature<'a> {
	pub feature: &'a InternalFeature,
	pub geometry: Geometry,
	pub style: Cow<'a, FeatureStyleInfo>,
}

/// The features of `tile` in pixel space, in tile order.
///
/// Collections are rejected for the whole tile. Features without geometry
/// are skipped silently and features failing the transformation with a
/// warning.
pub(crate) fn display_features<'a>(
	tile: &'a InternalTile,
	transform: &DisplayTransform,
) -> Result<Vec<DisplayFeature<'a>>> {
	let mut result = Vec::with_capacity(tile.features.len());
	for feature in &tile.features {
		let Some(geometry) = feature.display_geometry() else {
			continue;
		};
		if geometry.geometry_type() == GeometryType::Collection {
			return Err(RenderError::new(
				&tile.layer_id,
				tile.code,
				RenderErrorKind::UnsupportedGeometry(GeometryType::Collection),
			)
			.into());
		}
		match transform.apply(geometry) {
			Ok(geometry) => result.push(DisplayFeature {
				feature,
				geometry,
				style: feature
					.style
					.as_ref()
					.map_or_else(|| Cow::Owned(FeatureStyleInfo::default()), Cow::Borrowed),
			}),
			Err(error) => log::warn!(
				"not painting feature '{}' of tile {}: {error}",
				feature.id,
				tile.element_id()
			),
		}
	}
	Ok(result)
}

/// A label and its anchor in tile pixels.
pub(crate) struct DisplayLabel<'a> {
	pub feature: &'a InternalFeature,
	pub text: &'a str,
	pub position: [f64; 2],
}

/// Labels of all features, anchored at the center of the display geometry.
pub(crate) fn display_labels<'a>(tile: &'a InternalTile, transform: &DisplayTransform) -> Vec<DisplayLabel<'a>> {
	tile
		.features
		.iter()
		.filter_map(|feature| {
			let text = feature.label.as_deref()?;
			let [x, y] = feature.display_geometry()?.bounds()?.center();
			match transform.apply_coord(x, y) {
				Ok(position) => Some(DisplayLabel {
					feature,
					text,
					position,
				}),
				Err(error) => {
					log::warn!("not painting label of feature '{}': {error}", feature.id);
					None
				}
			}
		})
		.collect()
}

/// Pixel value with at most two decimals.
pub(crate) fn fmt_coord(value: f64) -> String {
	// adding 0.0 turns -0 into 0
	format!("{}", (value * 100.0).round() / 100.0 + 0.0)
}

pub(crate) fn escape_xml(text: &str) -> Cow<'_, str> {
	if !text.contains(['&', '<', '>', '"', '\'']) {
		return Cow::Borrowed(text);
	}
	let mut escaped = String::with_capacity(text.len() + 8);
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&apos;"),
			c => escaped.push(c),
		}
	}
	Cow::Owned(escaped)
}

/// Coordinates of a ring without the closing coordinate.
pub(crate) fn open_ring(ring: &LineString<f64>) -> &[Coord<f64>] {
	let coords = ring.0.as_slice();
	match coords {
		[first, .., last] if first == last => &coords[..coords.len() - 1],
		_ => coords,
	}
}

/// Exterior and interior rings of a polygon.
pub(crate) fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
	std::iter::once(polygon.exterior()).chain(polygon.interiors())
}
