use anyhow::{Result, ensure};
use serde::Deserialize;
use std::fmt::{self, Debug};

/// Axis-aligned rectangle in world coordinates.
#[derive(Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "[f64; 4]")]
pub struct Bbox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl Bbox {
	/// Create a bbox.
	///
	/// # Errors
	/// Returns an error if a minimum exceeds its maximum or a value is not finite.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Bbox> {
		ensure!(
			[x_min, y_min, x_max, y_max].iter().all(|v| v.is_finite()),
			"bbox values must be finite"
		);
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		Ok(Bbox {
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	#[must_use]
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	#[must_use]
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	#[must_use]
	pub fn center(&self) -> [f64; 2] {
		[(self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0]
	}

	/// `true` if both rectangles share at least one point (touching edges count).
	#[must_use]
	pub fn intersects(&self, other: &Bbox) -> bool {
		self.x_min <= other.x_max && other.x_min <= self.x_max && self.y_min <= other.y_max && other.y_min <= self.y_max
	}

	/// `true` if `other` lies completely inside `self`.
	#[must_use]
	pub fn contains(&self, other: &Bbox) -> bool {
		self.x_min <= other.x_min && self.y_min <= other.y_min && other.x_max <= self.x_max && other.y_max <= self.y_max
	}

	#[must_use]
	pub fn contains_point(&self, x: f64, y: f64) -> bool {
		self.x_min <= x && x <= self.x_max && self.y_min <= y && y <= self.y_max
	}

	/// Smallest bbox covering both.
	#[must_use]
	pub fn union(&self, other: &Bbox) -> Bbox {
		Bbox {
			x_min: self.x_min.min(other.x_min),
			y_min: self.y_min.min(other.y_min),
			x_max: self.x_max.max(other.x_max),
			y_max: self.y_max.max(other.y_max),
		}
	}

	/// Grow (or shrink, for negative values) the bbox by `distance` on every side.
	#[must_use]
	pub fn buffer(&self, distance: f64) -> Bbox {
		Bbox {
			x_min: self.x_min - distance,
			y_min: self.y_min - distance,
			x_max: self.x_max + distance,
			y_max: self.y_max + distance,
		}
	}

	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}
}

impl TryFrom<[f64; 4]> for Bbox {
	type Error = anyhow::Error;

	fn try_from(value: [f64; 4]) -> Result<Self> {
		Bbox::new(value[0], value[1], value[2], value[3])
	}
}

impl Debug for Bbox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {}, {}, {}]", self.x_min, self.y_min, self.x_max, self.y_max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bbox(v: [f64; 4]) -> Bbox {
		Bbox::try_from(v).unwrap()
	}

	#[test]
	fn new_rejects_inverted() {
		assert!(Bbox::new(1.0, 0.0, 0.0, 1.0).is_err());
		assert!(Bbox::new(0.0, 1.0, 1.0, 0.0).is_err());
		assert!(Bbox::new(0.0, 0.0, f64::NAN, 1.0).is_err());
	}

	#[test]
	fn dimensions() {
		let b = bbox([-10.0, 0.0, 30.0, 20.0]);
		assert_eq!(b.width(), 40.0);
		assert_eq!(b.height(), 20.0);
		assert_eq!(b.center(), [10.0, 10.0]);
	}

	#[test]
	fn intersects_and_contains() {
		let a = bbox([0.0, 0.0, 10.0, 10.0]);
		assert!(a.intersects(&bbox([10.0, 10.0, 20.0, 20.0])));
		assert!(!a.intersects(&bbox([10.1, 0.0, 20.0, 5.0])));
		assert!(a.contains(&bbox([1.0, 1.0, 9.0, 9.0])));
		assert!(!a.contains(&bbox([1.0, 1.0, 11.0, 9.0])));
		assert!(a.contains_point(10.0, 0.0));
	}

	#[test]
	fn union_and_buffer() {
		let a = bbox([0.0, 0.0, 1.0, 1.0]);
		let b = bbox([2.0, -1.0, 3.0, 0.5]);
		assert_eq!(a.union(&b), bbox([0.0, -1.0, 3.0, 1.0]));
		assert_eq!(a.buffer(1.0), bbox([-1.0, -1.0, 2.0, 2.0]));
	}

	#[test]
	fn deserialize_from_array() {
		let b: Bbox = serde_yaml_ng::from_str("[0, 1, 2, 3]").unwrap();
		assert_eq!(b.as_array(), [0.0, 1.0, 2.0, 3.0]);
		assert!(serde_yaml_ng::from_str::<Bbox>("[3, 1, 2, 3]").is_err());
	}
}
