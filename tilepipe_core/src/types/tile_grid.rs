use super::{Bbox, TileCode, TileRange};
use anyhow::{Result, ensure};
use serde::Deserialize;

/// Splits a layer's maximum extent into a quadtree of tiles.
///
/// At level `L` the extent is cut into `2^L × 2^L` equally sized tiles;
/// row 0 is the northern-most (largest `y`) row.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileGrid {
	pub extent: Bbox,
	#[serde(default = "default_tile_size")]
	pub tile_width: u32,
	#[serde(default = "default_tile_size")]
	pub tile_height: u32,
}

fn default_tile_size() -> u32 {
	256
}

impl TileGrid {
	#[must_use]
	pub fn new(extent: Bbox) -> Self {
		TileGrid {
			extent,
			tile_width: default_tile_size(),
			tile_height: default_tile_size(),
		}
	}

	fn tile_size(&self, level: u8) -> (f64, f64) {
		let count = (1u64 << level) as f64;
		(self.extent.width() / count, self.extent.height() / count)
	}

	/// World bounds of the tile named by `code`.
	#[must_use]
	pub fn tile_bounds(&self, code: &TileCode) -> Bbox {
		let (width, height) = self.tile_size(code.level);
		let x_min = self.extent.x_min + f64::from(code.x) * width;
		let y_max = self.extent.y_max - f64::from(code.y) * height;
		Bbox {
			x_min,
			y_min: y_max - height,
			x_max: x_min + width,
			y_max,
		}
	}

	/// Tile at `level` that contains the world position `(x, y)`.
	///
	/// Positions on the outer edge are clamped into the grid.
	///
	/// # Errors
	/// Returns an error if `level` > 31 or the position lies outside the extent.
	pub fn tile_at(&self, level: u8, x: f64, y: f64) -> Result<TileCode> {
		ensure!(level <= 31, "level ({level}) must be <= 31");
		ensure!(
			self.extent.contains_point(x, y),
			"position ({x}, {y}) is outside the grid extent {:?}",
			self.extent
		);
		let (width, height) = self.tile_size(level);
		let max = (1u64 << level) - 1;
		let col = (((x - self.extent.x_min) / width).floor() as u64).min(max);
		let row = (((self.extent.y_max - y) / height).floor() as u64).min(max);
		TileCode::new(level, col as u32, row as u32)
	}

	/// All tiles at `level` touching `bbox`, clipped to the grid.
	///
	/// # Errors
	/// Returns an error if `level` > 31 or `bbox` does not intersect the extent.
	pub fn range_for(&self, level: u8, bbox: &Bbox) -> Result<TileRange> {
		ensure!(level <= 31, "level ({level}) must be <= 31");
		ensure!(self.extent.intersects(bbox), "{bbox:?} does not intersect the grid extent");
		let clamp = |v: f64, min: f64, max: f64| v.max(min).min(max);
		let e = &self.extent;
		let top_left = self.tile_at(
			level,
			clamp(bbox.x_min, e.x_min, e.x_max),
			clamp(bbox.y_max, e.y_min, e.y_max),
		)?;
		let bottom_right = self.tile_at(
			level,
			clamp(bbox.x_max, e.x_min, e.x_max),
			clamp(bbox.y_min, e.y_min, e.y_max),
		)?;
		TileRange::new(level, top_left.x, top_left.y, bottom_right.x, bottom_right.y)
	}
}
