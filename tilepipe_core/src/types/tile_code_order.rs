//! Fetch ordering for tile codes around a focal tile.
//!
//! When a viewport needs many tiles, the tiles nearest to the user's focus
//! should arrive first. [`TileCodeComparator`] orders codes by the square
//! ring they occupy around a reference position (the reference itself is
//! ring 0), and inside a ring by walking the ring clockwise, starting with
//! the cell straight above the reference. Rows grow downwards, so "above"
//! means a smaller `y`.
//!
//! Ring 1 around `(3, 2)` is therefore visited as
//! `(3,1) (4,1) (4,2) (4,3) (3,3) (2,3) (2,2) (2,1)`.

use super::TileCode;
use std::cmp::Ordering;

/// Total order over [`TileCode`]s by ring distance from a reference tile.
///
/// The comparison key is `(ring, ring_position, level, x, y)`, so the order
/// never depends on the order of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileCodeComparator {
	x: i64,
	y: i64,
}

impl TileCodeComparator {
	/// Create a comparator centred on column `x`, row `y`.
	#[must_use]
	pub fn new(x: u32, y: u32) -> Self {
		Self {
			x: i64::from(x),
			y: i64::from(y),
		}
	}

	/// Create a comparator centred on the given tile.
	#[must_use]
	pub fn centered_on(code: &TileCode) -> Self {
		Self::new(code.x, code.y)
	}

	fn offset(&self, code: &TileCode) -> (i64, i64) {
		(i64::from(code.x) - self.x, i64::from(code.y) - self.y)
	}

	/// Chebyshev distance between `code` and the reference position.
	#[must_use]
	pub fn ring(&self, code: &TileCode) -> u64 {
		let (dx, dy) = self.offset(code);
		dx.unsigned_abs().max(dy.unsigned_abs())
	}

	/// Position of `code` along its ring, in `0..8 * ring`.
	///
	/// Position 0 is the cell straight above the reference; positions grow
	/// clockwise (right edge, bottom edge, left edge, back to the top).
	#[must_use]
	pub fn ring_position(&self, code: &TileCode) -> u64 {
		let (dx, dy) = self.offset(code);
		let r = dx.abs().max(dy.abs());
		if r == 0 {
			return 0;
		}
		let position = if dy == -r && dx >= 0 {
			dx
		} else if dx == r {
			r + (dy + r)
		} else if dy == r {
			3 * r + (r - dx)
		} else if dx == -r {
			5 * r + (r - dy)
		} else {
			// top edge, left of the reference column
			7 * r + (dx + r)
		};
		position as u64
	}

	/// Compare two codes; a total order suitable for any sort.
	#[must_use]
	pub fn compare(&self, a: &TileCode, b: &TileCode) -> Ordering {
		self
			.ring(a)
			.cmp(&self.ring(b))
			.then_with(|| self.ring_position(a).cmp(&self.ring_position(b)))
			.then_with(|| a.cmp(b))
	}

	/// Sort `codes` in fetch order.
	pub fn sort(&self, codes: &mut [TileCode]) {
		codes.sort_by(|a, b| self.compare(a, b));
	}
}
