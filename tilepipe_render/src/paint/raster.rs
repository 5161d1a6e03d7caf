use super::{DisplayFeature, DisplayTransform, TilePainter, display_features, open_ring, rings, svg::point_coords};
use crate::{InternalTile, RenderError, RenderErrorKind, TileContent};
use anyhow::{Result, bail};
use image::{
	ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage,
	codecs::png::{self, CompressionType, FilterType},
};
use imageproc::{
	drawing::{
		Blend, draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut,
		draw_line_segment_mut, draw_polygon_mut,
	},
	point::Point,
	rect::Rect,
};
use tilepipe_core::{FeatureStyleInfo, SymbolInfo, TileMetadata};
use tilepipe_geometry::{Coord, Geometry, LineString, Polygon};

/// Rasterizes the features of a tile into a PNG image.
///
/// Polygons are filled and outlined, lines are stroked one pixel wide and
/// points are drawn with their style symbol. Holes of polygons are outlined
/// but not cut out of the fill. Labels are not rasterized.
pub struct TileImageCreator;

impl TileImageCreator {
	/// The painted image of `tile`.
	pub fn create_image(&self, tile: &InternalTile, metadata: &TileMetadata) -> Result<RgbaImage> {
		if tile.screen_width == 0 || tile.screen_height == 0 {
			return Err(encoding_error(tile, "tile has no pixels".to_string()).into());
		}
		let mut canvas = Blend(RgbaImage::new(tile.screen_width, tile.screen_height));
		if metadata.paint_geometries {
			let transform = DisplayTransform::for_tile(tile, metadata);
			for feature in display_features(tile, &transform)? {
				draw_feature(&mut canvas, &feature).map_err(|e| encoding_error(tile, e.to_string()))?;
			}
		}
		Ok(canvas.0)
	}
}

impl TilePainter for TileImageCreator {
	fn paint(&self, tile: &mut InternalTile, metadata: &TileMetadata) -> Result<()> {
		let image = self.create_image(tile, metadata)?;
		let mut buffer: Vec<u8> = Vec::new();
		png::PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive)
			.write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
			.map_err(|e| encoding_error(tile, e.to_string()))?;
		log::trace!("painted PNG tile {} ({} bytes)", tile.element_id(), buffer.len());
		tile.content = Some(TileContent::Image {
			format: ImageFormat::Png,
			data: buffer,
		});
		Ok(())
	}
}

fn encoding_error(tile: &InternalTile, message: String) -> RenderError {
	RenderError::new(&tile.layer_id, tile.code, RenderErrorKind::Encoding(message))
}

/// `#rrggbb` or `#rgb` with the given opacity.
fn parse_color(color: &str, opacity: f32) -> Result<Rgba<u8>> {
	let hex = color.strip_prefix('#').unwrap_or(color);
	let digits: Vec<u8> = match hex.len() {
		3 => hex.chars().flat_map(|c| [c, c]).map(hex_digit).collect::<Option<_>>(),
		6 => hex.chars().map(hex_digit).collect::<Option<_>>(),
		_ => None,
	}
	.unwrap_or_default();
	if digits.len() != 6 {
		bail!("invalid color '{color}'");
	}
	let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
	Ok(Rgba([
		digits[0] * 16 + digits[1],
		digits[2] * 16 + digits[3],
		digits[4] * 16 + digits[5],
		alpha,
	]))
}

fn hex_digit(c: char) -> Option<u8> {
	c.to_digit(16).map(|d| d as u8)
}

type BlendImage = Blend<RgbaImage>;

fn pixel(c: &Coord<f64>) -> (i32, i32) {
	(c.x.round() as i32, c.y.round() as i32)
}

fn pixel_f32(c: &Coord<f64>) -> (f32, f32) {
	(c.x as f32, c.y as f32)
}

fn draw_feature(canvas: &mut BlendImage, feature: &DisplayFeature) -> Result<()> {
	let style: &FeatureStyleInfo = &feature.style;
	let fill = parse_color(&style.fill_color, style.fill_opacity)?;
	let stroke = parse_color(&style.stroke_color, style.stroke_opacity)?;
	match &feature.geometry {
		Geometry::Polygon(p) => draw_polygon(canvas, p, fill, stroke),
		Geometry::MultiPolygon(m) => m.iter().for_each(|p| draw_polygon(canvas, p, fill, stroke)),
		Geometry::LineString(l) => draw_line(canvas, &l.0, stroke),
		Geometry::MultiLineString(m) => m.iter().for_each(|l| draw_line(canvas, &l.0, stroke)),
		geometry => {
			let symbol = style.point_symbol();
			for point in point_coords(geometry).unwrap_or_default() {
				draw_symbol(canvas, &point, &symbol, fill, stroke);
			}
		}
	}
	Ok(())
}

fn draw_polygon(canvas: &mut BlendImage, polygon: &Polygon<f64>, fill: Rgba<u8>, stroke: Rgba<u8>) {
	let mut points: Vec<Point<i32>> = open_ring(polygon.exterior())
		.iter()
		.map(|c| {
			let (x, y) = pixel(c);
			Point::new(x, y)
		})
		.collect();
	points.dedup();
	while points.len() > 1 && points.first() == points.last() {
		points.pop();
	}
	if points.len() >= 3 {
		draw_polygon_mut(canvas, &points, fill);
	}
	for ring in rings(polygon) {
		draw_ring(canvas, ring, stroke);
	}
}

fn draw_ring(canvas: &mut BlendImage, ring: &LineString<f64>, stroke: Rgba<u8>) {
	let coords = open_ring(ring);
	draw_line(canvas, coords, stroke);
	if let [first, .., last] = coords {
		draw_line_segment_mut(canvas, pixel_f32(last), pixel_f32(first), stroke);
	}
}

fn draw_line(canvas: &mut BlendImage, coords: &[Coord<f64>], stroke: Rgba<u8>) {
	for pair in coords.windows(2) {
		draw_line_segment_mut(canvas, pixel_f32(&pair[0]), pixel_f32(&pair[1]), stroke);
	}
}

fn draw_symbol(canvas: &mut BlendImage, center: &Coord<f64>, symbol: &SymbolInfo, fill: Rgba<u8>, stroke: Rgba<u8>) {
	let (x, y) = pixel(center);
	match symbol {
		SymbolInfo::Circle { radius } => {
			let radius = radius.round().max(1.0) as i32;
			draw_filled_circle_mut(canvas, (x, y), radius, fill);
			draw_hollow_circle_mut(canvas, (x, y), radius, stroke);
		}
		SymbolInfo::Rect { width, height } => {
			let width = width.round().max(1.0) as u32;
			let height = height.round().max(1.0) as u32;
			let rect = Rect::at(x - (width / 2) as i32, y - (height / 2) as i32).of_size(width, height);
			draw_filled_rect_mut(canvas, rect, fill);
			draw_hollow_rect_mut(canvas, rect, stroke);
		}
	}
}
