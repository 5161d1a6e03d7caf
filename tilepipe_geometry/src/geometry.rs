use geo::{BooleanOps, BoundingRect, Intersects, MapCoords, Relate, Rect};
use itertools::Itertools;
use serde::Deserialize;
use std::fmt::{self, Debug, Display};
use tilepipe_core::Bbox;

pub use geo::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

/// The closed set of geometry kinds a feature can carry.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(from = "GeometryDef")]
pub enum Geometry {
	Point(Point<f64>),
	LineString(LineString<f64>),
	Polygon(Polygon<f64>),
	MultiPoint(MultiPoint<f64>),
	MultiLineString(MultiLineString<f64>),
	MultiPolygon(MultiPolygon<f64>),
	Collection(Vec<Geometry>),
}

/// Discriminant of [`Geometry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryType {
	Point,
	LineString,
	Polygon,
	MultiPoint,
	MultiLineString,
	MultiPolygon,
	Collection,
}

impl Display for GeometryType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Debug::fmt(self, f)
	}
}

fn ring(coords: Vec<[f64; 2]>) -> LineString<f64> {
	LineString::from(coords)
}

fn polygon(mut rings: Vec<Vec<[f64; 2]>>) -> Polygon<f64> {
	if rings.is_empty() {
		return Polygon::new(LineString::new(vec![]), vec![]);
	}
	let exterior = ring(rings.remove(0));
	Polygon::new(exterior, rings.into_iter().map(ring).collect())
}

impl Geometry {
	pub fn new_point(value: [f64; 2]) -> Self {
		Self::Point(Point::from(value))
	}
	pub fn new_line_string(value: Vec<[f64; 2]>) -> Self {
		Self::LineString(ring(value))
	}
	/// The first ring is the exterior, the others are holes.
	pub fn new_polygon(value: Vec<Vec<[f64; 2]>>) -> Self {
		Self::Polygon(polygon(value))
	}
	pub fn new_multi_point(value: Vec<[f64; 2]>) -> Self {
		Self::MultiPoint(MultiPoint::from(value))
	}
	pub fn new_multi_line_string(value: Vec<Vec<[f64; 2]>>) -> Self {
		Self::MultiLineString(MultiLineString::new(value.into_iter().map(ring).collect()))
	}
	pub fn new_multi_polygon(value: Vec<Vec<Vec<[f64; 2]>>>) -> Self {
		Self::MultiPolygon(MultiPolygon::new(value.into_iter().map(polygon).collect()))
	}

	/// Rectangle polygon covering `bbox`.
	pub fn from_bbox(bbox: &Bbox) -> Self {
		let rect = Rect::new(
			Coord {
				x: bbox.x_min,
				y: bbox.y_min,
			},
			Coord {
				x: bbox.x_max,
				y: bbox.y_max,
			},
		);
		Self::Polygon(rect.to_polygon())
	}

	pub fn geometry_type(&self) -> GeometryType {
		match self {
			Geometry::Point(_) => GeometryType::Point,
			Geometry::LineString(_) => GeometryType::LineString,
			Geometry::Polygon(_) => GeometryType::Polygon,
			Geometry::MultiPoint(_) => GeometryType::MultiPoint,
			Geometry::MultiLineString(_) => GeometryType::MultiLineString,
			Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
			Geometry::Collection(_) => GeometryType::Collection,
		}
	}

	pub fn to_geo(&self) -> geo::Geometry<f64> {
		match self {
			Geometry::Point(g) => geo::Geometry::Point(*g),
			Geometry::LineString(g) => geo::Geometry::LineString(g.clone()),
			Geometry::Polygon(g) => geo::Geometry::Polygon(g.clone()),
			Geometry::MultiPoint(g) => geo::Geometry::MultiPoint(g.clone()),
			Geometry::MultiLineString(g) => geo::Geometry::MultiLineString(g.clone()),
			Geometry::MultiPolygon(g) => geo::Geometry::MultiPolygon(g.clone()),
			Geometry::Collection(g) => {
				geo::Geometry::GeometryCollection(geo::GeometryCollection::new_from(g.iter().map(Geometry::to_geo).collect()))
			}
		}
	}

	/// Bounding box, `None` for empty geometries.
	pub fn bounds(&self) -> Option<Bbox> {
		self.to_geo().bounding_rect().map(|r| Bbox {
			x_min: r.min().x,
			y_min: r.min().y,
			x_max: r.max().x,
			y_max: r.max().y,
		})
	}

	pub fn is_empty(&self) -> bool {
		match self {
			Geometry::Point(_) => false,
			Geometry::LineString(g) => g.0.is_empty(),
			Geometry::Polygon(g) => g.exterior().0.is_empty(),
			Geometry::MultiPoint(g) => g.0.is_empty(),
			Geometry::MultiLineString(g) => g.0.iter().all(|l| l.0.is_empty()),
			Geometry::MultiPolygon(g) => g.0.iter().all(|p| p.exterior().0.is_empty()),
			Geometry::Collection(g) => g.iter().all(Geometry::is_empty),
		}
	}

	/// Number of coordinates, used for logging and density decisions.
	pub fn coordinate_count(&self) -> usize {
		match self {
			Geometry::Point(_) => 1,
			Geometry::LineString(g) => g.0.len(),
			Geometry::Polygon(g) => g.exterior().0.len() + g.interiors().iter().map(|r| r.0.len()).sum::<usize>(),
			Geometry::MultiPoint(g) => g.0.len(),
			Geometry::MultiLineString(g) => g.0.iter().map(|l| l.0.len()).sum(),
			Geometry::MultiPolygon(g) => g
				.0
				.iter()
				.map(|p| p.exterior().0.len() + p.interiors().iter().map(|r| r.0.len()).sum::<usize>())
				.sum(),
			Geometry::Collection(g) => g.iter().map(Geometry::coordinate_count).sum(),
		}
	}

	pub fn intersects(&self, other: &Geometry) -> bool {
		self.to_geo().intersects(&other.to_geo())
	}

	/// `true` if `self` lies completely inside `other`.
	pub fn is_within(&self, other: &Geometry) -> bool {
		self.to_geo().relate(&other.to_geo()).is_within()
	}

	/// Apply a fallible transformation to every coordinate.
	pub fn try_map_coords<E>(&self, func: impl Fn(Coord<f64>) -> Result<Coord<f64>, E> + Copy) -> Result<Geometry, E> {
		Ok(match self {
			Geometry::Point(g) => Geometry::Point(g.try_map_coords(func)?),
			Geometry::LineString(g) => Geometry::LineString(g.try_map_coords(func)?),
			Geometry::Polygon(g) => Geometry::Polygon(g.try_map_coords(func)?),
			Geometry::MultiPoint(g) => Geometry::MultiPoint(g.try_map_coords(func)?),
			Geometry::MultiLineString(g) => Geometry::MultiLineString(g.try_map_coords(func)?),
			Geometry::MultiPolygon(g) => Geometry::MultiPolygon(g.try_map_coords(func)?),
			Geometry::Collection(g) => {
				Geometry::Collection(g.iter().map(|c| c.try_map_coords(func)).collect::<Result<Vec<_>, E>>()?)
			}
		})
	}

	/// The part of the geometry inside `bbox`, `None` if nothing is left.
	///
	/// Polygons are intersected with the box, lines are cut at its border and
	/// points outside the box are dropped.
	pub fn clip(&self, bbox: &Bbox) -> Option<Geometry> {
		let Geometry::Polygon(window) = Geometry::from_bbox(bbox) else {
			return None;
		};
		let clipped = match self {
			Geometry::Point(p) => bbox.contains_point(p.x(), p.y()).then_some(Geometry::Point(*p)),
			Geometry::MultiPoint(g) => {
				let points: Vec<Point<f64>> = g.iter().filter(|p| bbox.contains_point(p.x(), p.y())).copied().collect();
				(!points.is_empty()).then(|| Geometry::MultiPoint(MultiPoint::new(points)))
			}
			Geometry::LineString(g) => {
				let mut lines = window.clip(&MultiLineString::new(vec![g.clone()]), false);
				match lines.0.len() {
					0 => None,
					1 => lines.0.pop().map(Geometry::LineString),
					_ => Some(Geometry::MultiLineString(lines)),
				}
			}
			Geometry::MultiLineString(g) => {
				let lines = window.clip(g, false);
				(!lines.0.is_empty()).then_some(Geometry::MultiLineString(lines))
			}
			Geometry::Polygon(g) => {
				let mut polygons = g.intersection(&window);
				match polygons.0.len() {
					0 => None,
					1 => polygons.0.pop().map(Geometry::Polygon),
					_ => Some(Geometry::MultiPolygon(polygons)),
				}
			}
			Geometry::MultiPolygon(g) => {
				let polygons = g.intersection(&window);
				(!polygons.0.is_empty()).then_some(Geometry::MultiPolygon(polygons))
			}
			Geometry::Collection(g) => {
				let parts: Vec<Geometry> = g.iter().filter_map(|c| c.clip(bbox)).collect();
				(!parts.is_empty()).then_some(Geometry::Collection(parts))
			}
		};
		clipped.filter(|g| !g.is_empty())
	}

	/// Well-known text, used in filter strings and logs.
	pub fn to_wkt(&self) -> String {
		fn coord(c: &Coord<f64>) -> String {
			format!("{} {}", c.x, c.y)
		}
		fn line(l: &LineString<f64>) -> String {
			format!("({})", l.0.iter().map(coord).join(", "))
		}
		fn poly(p: &Polygon<f64>) -> String {
			format!(
				"({})",
				std::iter::once(p.exterior()).chain(p.interiors()).map(line).join(", ")
			)
		}
		match self {
			Geometry::Point(g) => format!("POINT ({})", coord(&g.0)),
			Geometry::LineString(g) => format!("LINESTRING {}", line(g)),
			Geometry::Polygon(g) => format!("POLYGON {}", poly(g)),
			Geometry::MultiPoint(g) => format!("MULTIPOINT ({})", g.iter().map(|p| format!("({})", coord(&p.0))).join(", ")),
			Geometry::MultiLineString(g) => format!("MULTILINESTRING ({})", g.iter().map(line).join(", ")),
			Geometry::MultiPolygon(g) => format!("MULTIPOLYGON ({})", g.iter().map(poly).join(", ")),
			Geometry::Collection(g) => format!("GEOMETRYCOLLECTION ({})", g.iter().map(Geometry::to_wkt).join(", ")),
		}
	}
}

impl Debug for Geometry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_wkt())
	}
}

/// GeoJSON-style `{type, coordinates}` representation used in configuration files.
#[derive(Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum GeometryDef {
	Point([f64; 2]),
	LineString(Vec<[f64; 2]>),
	Polygon(Vec<Vec<[f64; 2]>>),
	MultiPoint(Vec<[f64; 2]>),
	MultiLineString(Vec<Vec<[f64; 2]>>),
	MultiPolygon(Vec<Vec<Vec<[f64; 2]>>>),
}

impl From<GeometryDef> for Geometry {
	fn from(value: GeometryDef) -> Self {
		match value {
			GeometryDef::Point(c) => Geometry::new_point(c),
			GeometryDef::LineString(c) => Geometry::new_line_string(c),
			GeometryDef::Polygon(c) => Geometry::new_polygon(c),
			GeometryDef::MultiPoint(c) => Geometry::new_multi_point(c),
			GeometryDef::MultiLineString(c) => Geometry::new_multi_line_string(c),
			GeometryDef::MultiPolygon(c) => Geometry::new_multi_polygon(c),
		}
	}
}
