use super::{TileCode, TileCodeComparator};
use anyhow::{Result, ensure};
use std::fmt::{self, Debug};

/// Inclusive rectangle of tile codes on one level.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
	pub level: u8,
	pub x_min: u32,
	pub y_min: u32,
	pub x_max: u32,
	pub y_max: u32,
}

impl TileRange {
	/// # Errors
	/// Returns an error if the corners are outside the level or inverted.
	pub fn new(level: u8, x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<TileRange> {
		TileCode::new(level, x_max, y_max)?;
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		Ok(TileRange {
			level,
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	/// Range of `width × height` tiles centred on `center`, clipped to the level.
	///
	/// # Errors
	/// Returns an error if `width` or `height` is zero.
	pub fn around(center: &TileCode, width: u32, height: u32) -> Result<TileRange> {
		ensure!(width > 0 && height > 0, "range must not be empty");
		let max = (center.grid_size() - 1) as u32;
		let x_min = center.x.saturating_sub((width - 1) / 2);
		let y_min = center.y.saturating_sub((height - 1) / 2);
		TileRange::new(
			center.level,
			x_min,
			y_min,
			x_min.saturating_add(width - 1).min(max),
			y_min.saturating_add(height - 1).min(max),
		)
	}

	#[must_use]
	pub fn count(&self) -> u64 {
		u64::from(self.x_max - self.x_min + 1) * u64::from(self.y_max - self.y_min + 1)
	}

	#[must_use]
	pub fn contains(&self, code: &TileCode) -> bool {
		code.level == self.level
			&& (self.x_min..=self.x_max).contains(&code.x)
			&& (self.y_min..=self.y_max).contains(&code.y)
	}

	/// Iterate the codes row by row.
	pub fn iter_codes(&self) -> impl Iterator<Item = TileCode> + '_ {
		(self.y_min..=self.y_max)
			.flat_map(move |y| (self.x_min..=self.x_max).map(move |x| TileCode { level: self.level, x, y }))
	}

	/// All codes in fetch order around `center`.
	#[must_use]
	pub fn spiral_codes(&self, center: &TileCode) -> Vec<TileCode> {
		let mut codes: Vec<TileCode> = self.iter_codes().collect();
		TileCodeComparator::centered_on(center).sort(&mut codes);
		codes
	}
}

impl Debug for TileRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}: [{},{},{},{}] ({})",
			self.level,
			self.x_min,
			self.y_min,
			self.x_max,
			self.y_max,
			self.count()
		)
	}
}
