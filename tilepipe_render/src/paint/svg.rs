use super::{
	DisplayFeature, DisplayTransform, TilePainter, display_features, display_labels, escape_xml, fmt_coord, open_ring,
	rings,
};
use crate::{InternalTile, TileContent};
use anyhow::Result;
use std::{collections::BTreeMap, fmt::Write};
use tilepipe_core::{LabelStyle, SymbolInfo, TileMetadata};
use tilepipe_geometry::{Coord, Geometry};

/// Paints tiles as an SVG document.
///
/// Lines and polygons become one `<path>` each. Points refer to a shared
/// `<symbol>` per style: a `<g>` carrying the style holds one `<use>` per
/// point.
pub struct SvgTilePainter;

impl TilePainter for SvgTilePainter {
	fn paint(&self, tile: &mut InternalTile, metadata: &TileMetadata) -> Result<()> {
		let transform = DisplayTransform::for_tile(tile, metadata);
		let prefix = escape_xml(&tile.element_id()).into_owned();
		let mut svg = String::new();
		write!(
			svg,
			r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{}" height="{}">"#,
			tile.screen_width, tile.screen_height
		)?;
		if metadata.paint_geometries {
			write_features(&mut svg, &prefix, &display_features(tile, &transform)?)?;
		}
		if metadata.paint_labels {
			let style = metadata.style.label_style.clone().unwrap_or_default();
			write!(svg, r#"<g id="{prefix}.labels">"#)?;
			for label in display_labels(tile, &transform) {
				let [x, y] = label.position;
				write!(
					svg,
					r#"<text id="{prefix}.{}.label" x="{}" y="{}" style="{}">{}</text>"#,
					escape_xml(&label.feature.id),
					fmt_coord(x),
					fmt_coord(y),
					label_css(&style),
					escape_xml(label.text)
				)?;
			}
			svg.push_str("</g>");
		}
		svg.push_str("</svg>");
		log::trace!("painted SVG tile {} ({} bytes)", tile.element_id(), svg.len());
		tile.content = Some(TileContent::Svg(svg));
		Ok(())
	}
}

fn label_css(style: &LabelStyle) -> String {
	format!(
		"font-size:{}px;fill:{};text-anchor:middle;",
		style.font_size,
		escape_xml(&style.font_color)
	)
}

fn symbol_id(prefix: &str, index: u32) -> String {
	format!("{prefix}.symbol.{index}")
}

fn write_features(svg: &mut String, prefix: &str, features: &[DisplayFeature]) -> Result<()> {
	write!(svg, r#"<g id="{prefix}.features">"#)?;

	let symbols: BTreeMap<u32, SymbolInfo> = features
		.iter()
		.filter(|f| point_coords(&f.geometry).is_some())
		.map(|f| (f.style.index, f.style.point_symbol()))
		.rev()
		.collect();
	if !symbols.is_empty() {
		svg.push_str("<defs>");
		for (index, symbol) in &symbols {
			write!(svg, r#"<symbol id="{}" overflow="visible">"#, symbol_id(prefix, *index))?;
			match symbol {
				SymbolInfo::Circle { radius } => write!(svg, r#"<circle cx="0" cy="0" r="{}"/>"#, fmt_coord(*radius))?,
				SymbolInfo::Rect { width, height } => write!(
					svg,
					r#"<rect x="{}" y="{}" width="{}" height="{}"/>"#,
					fmt_coord(-width / 2.0),
					fmt_coord(-height / 2.0),
					fmt_coord(*width),
					fmt_coord(*height)
				)?,
			}
			svg.push_str("</symbol>");
		}
		svg.push_str("</defs>");
	}

	for feature in features {
		let id = escape_xml(&feature.feature.id);
		let css = escape_xml(&feature.style.to_css()).into_owned();
		if let Some(points) = point_coords(&feature.geometry) {
			let href = symbol_id(prefix, feature.style.index);
			write!(svg, r#"<g id="{prefix}.{id}" style="{css}">"#)?;
			for point in points {
				write!(
					svg,
					r##"<use xlink:href="#{href}" x="{}" y="{}"/>"##,
					fmt_coord(point.x),
					fmt_coord(point.y)
				)?;
			}
			svg.push_str("</g>");
		} else {
			let is_line = matches!(feature.geometry, Geometry::LineString(_) | Geometry::MultiLineString(_));
			write!(
				svg,
				r#"<path id="{prefix}.{id}" style="{css}{}" d="{}"/>"#,
				if is_line { "fill:none;" } else { "" },
				path_data(&feature.geometry)
			)?;
		}
	}
	svg.push_str("</g>");
	Ok(())
}

/// Coordinates of point geometries, `None` for all other kinds.
pub(super) fn point_coords(geometry: &Geometry) -> Option<Vec<Coord<f64>>> {
	match geometry {
		Geometry::Point(p) => Some(vec![p.0]),
		Geometry::MultiPoint(m) => Some(m.iter().map(|p| p.0).collect()),
		_ => None,
	}
}

fn push_path(d: &mut String, coords: &[Coord<f64>], close: bool) {
	for (index, c) in coords.iter().enumerate() {
		match index {
			0 if d.is_empty() => d.push('M'),
			0 => d.push_str(" M"),
			1 => d.push_str(" L"),
			_ => d.push(' '),
		}
		d.push_str(&fmt_coord(c.x));
		d.push(' ');
		d.push_str(&fmt_coord(c.y));
	}
	if close && !coords.is_empty() {
		d.push_str(" Z");
	}
}

fn path_data(geometry: &Geometry) -> String {
	let mut d = String::new();
	match geometry {
		Geometry::LineString(l) => push_path(&mut d, &l.0, false),
		Geometry::MultiLineString(m) => m.iter().for_each(|l| push_path(&mut d, &l.0, false)),
		Geometry::Polygon(p) => rings(p).for_each(|r| push_path(&mut d, open_ring(r), true)),
		Geometry::MultiPolygon(m) => m
			.iter()
			.flat_map(rings)
			.for_each(|r| push_path(&mut d, open_ring(r), true)),
		Geometry::Point(_) | Geometry::MultiPoint(_) | Geometry::Collection(_) => {}
	}
	d
}
