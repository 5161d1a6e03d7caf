use crate::Geometry;
use geo::Coord;
use std::{f64::consts::PI, fmt, str::FromStr};
use tilepipe_core::Bbox;

const EARTH_RADIUS: f64 = 6_378_137.0;
/// Latitude at which spherical mercator becomes square.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

/// Coordinate reference systems the tile pipeline understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Crs {
	/// Longitude/latitude in degrees.
	Wgs84,
	/// Spherical mercator in meters.
	WebMercator,
}

impl Crs {
	pub fn code(&self) -> &'static str {
		match self {
			Crs::Wgs84 => "EPSG:4326",
			Crs::WebMercator => "EPSG:3857",
		}
	}
}

impl fmt::Display for Crs {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.code())
	}
}

impl FromStr for Crs {
	type Err = TransformError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"EPSG:4326" | "CRS:84" => Ok(Crs::Wgs84),
			"EPSG:3857" | "EPSG:900913" => Ok(Crs::WebMercator),
			_ => Err(TransformError::UnknownCrs(s.to_string())),
		}
	}
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TransformError {
	#[error("unknown coordinate reference system '{0}'")]
	UnknownCrs(String),
	#[error("coordinate ({x}, {y}) can not be transformed to {target}")]
	OutOfBounds { x: f64, y: f64, target: Crs },
}

/// Transforms geometries between coordinate reference systems.
pub trait GeoService: Send + Sync {
	fn transform(&self, geometry: &Geometry, from: Crs, to: Crs) -> Result<Geometry, TransformError>;

	fn transform_bbox(&self, bbox: &Bbox, from: Crs, to: Crs) -> Result<Bbox, TransformError>;
}

/// Identity and spherical mercator transformations.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultGeoService;

fn to_mercator(c: Coord<f64>) -> Result<Coord<f64>, TransformError> {
	if !(-180.0..=180.0).contains(&c.x) || !(-MAX_MERCATOR_LATITUDE..=MAX_MERCATOR_LATITUDE).contains(&c.y) {
		return Err(TransformError::OutOfBounds {
			x: c.x,
			y: c.y,
			target: Crs::WebMercator,
		});
	}
	Ok(Coord {
		x: EARTH_RADIUS * c.x.to_radians(),
		y: EARTH_RADIUS * (PI / 4.0 + c.y.to_radians() / 2.0).tan().ln(),
	})
}

fn to_wgs84(c: Coord<f64>) -> Result<Coord<f64>, TransformError> {
	let limit = PI * EARTH_RADIUS;
	if !c.x.is_finite() || !c.y.is_finite() || c.x.abs() > limit * (1.0 + 1e-9) || c.y.abs() > limit * (1.0 + 1e-9) {
		return Err(TransformError::OutOfBounds {
			x: c.x,
			y: c.y,
			target: Crs::Wgs84,
		});
	}
	Ok(Coord {
		x: (c.x / EARTH_RADIUS).to_degrees(),
		y: (2.0 * (c.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees(),
	})
}

fn transform_coord(c: Coord<f64>, from: Crs, to: Crs) -> Result<Coord<f64>, TransformError> {
	match (from, to) {
		(Crs::Wgs84, Crs::WebMercator) => to_mercator(c),
		(Crs::WebMercator, Crs::Wgs84) => to_wgs84(c),
		_ => Ok(c),
	}
}

impl GeoService for DefaultGeoService {
	fn transform(&self, geometry: &Geometry, from: Crs, to: Crs) -> Result<Geometry, TransformError> {
		if from == to {
			return Ok(geometry.clone());
		}
		geometry.try_map_coords(|c| transform_coord(c, from, to))
	}

	fn transform_bbox(&self, bbox: &Bbox, from: Crs, to: Crs) -> Result<Bbox, TransformError> {
		if from == to {
			return Ok(*bbox);
		}
		let min = transform_coord(
			Coord {
				x: bbox.x_min,
				y: bbox.y_min,
			},
			from,
			to,
		)?;
		let max = transform_coord(
			Coord {
				x: bbox.x_max,
				y: bbox.y_max,
			},
			from,
			to,
		)?;
		Ok(Bbox {
			x_min: min.x,
			y_min: min.y,
			x_max: max.x,
			y_max: max.y,
		})
	}
}
