//! Tile positions inside a quadtree pyramid.
//!
//! A [`TileCode`] names one tile by its level and its column/row on that
//! level. Codes are immutable values; equality and ordering are structural
//! (`level`, then `x`, then `y`).
//!
//! ```
//! use tilepipe_core::TileCode;
//!
//! let code = TileCode::new(3, 5, 2).unwrap();
//! assert_eq!(code.to_string(), "3-5-2");
//! assert_eq!(code.parent(), Some(TileCode::new(2, 2, 1).unwrap()));
//! ```

use anyhow::{Context, Result, ensure};
use std::{
	fmt::{self, Debug, Display},
	str::FromStr,
};

/// Position of a tile: zoom level plus column (`x`) and row (`y`).
///
/// Row 0 is the top row of the grid.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TileCode {
	/// The zoom level of the tile.
	pub level: u8,
	/// The column of the tile.
	pub x: u32,
	/// The row of the tile.
	pub y: u32,
}

impl TileCode {
	/// Create a new `TileCode`.
	///
	/// # Errors
	/// Returns an error if `level` > 31 or if `x`/`y` are outside the `2^level` grid.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCode> {
		ensure!(level <= 31, "level ({level}) must be <= 31");
		let max = 1u64 << level;
		ensure!(u64::from(x) < max, "x ({x}) out of bounds for level {level}");
		ensure!(u64::from(y) < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCode { level, x, y })
	}

	/// Number of tiles along one axis at this code's level.
	#[must_use]
	pub fn grid_size(&self) -> u64 {
		1u64 << self.level
	}

	/// The tile one level up that covers this tile, or `None` at level 0.
	#[must_use]
	pub fn parent(&self) -> Option<TileCode> {
		if self.level == 0 {
			return None;
		}
		Some(TileCode {
			level: self.level - 1,
			x: self.x / 2,
			y: self.y / 2,
		})
	}

	/// The four tiles one level down, in row-major order, or `None` at level 31.
	#[must_use]
	pub fn children(&self) -> Option<[TileCode; 4]> {
		if self.level >= 31 {
			return None;
		}
		let level = self.level + 1;
		let (x, y) = (self.x * 2, self.y * 2);
		Some([
			TileCode { level, x, y },
			TileCode { level, x: x + 1, y },
			TileCode { level, x, y: y + 1 },
			TileCode {
				level,
				x: x + 1,
				y: y + 1,
			},
		])
	}
}

impl Display for TileCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}-{}", self.level, self.x, self.y)
	}
}

impl Debug for TileCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCode({}, [{}, {}])", self.level, self.x, self.y)
	}
}

impl FromStr for TileCode {
	type Err = anyhow::Error;

	/// Parses `level-x-y` or `level/x/y`.
	fn from_str(s: &str) -> Result<Self> {
		let parts: Vec<&str> = s.trim().split(['-', '/']).collect();
		ensure!(parts.len() == 3, "tile code '{s}' must look like 'level-x-y'");
		let level = parts[0].parse::<u8>().with_context(|| format!("invalid level in '{s}'"))?;
		let x = parts[1].parse::<u32>().with_context(|| format!("invalid x in '{s}'"))?;
		let y = parts[2].parse::<u32>().with_context(|| format!("invalid y in '{s}'"))?;
		TileCode::new(level, x, y)
	}
}
