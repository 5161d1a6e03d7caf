use super::{
	DisplayFeature, DisplayTransform, TilePainter, display_features, display_labels, escape_xml, open_ring, rings,
	svg::point_coords,
};
use crate::{InternalTile, TileContent};
use anyhow::Result;
use std::{
	collections::BTreeMap,
	fmt::{self, Write},
};
use tilepipe_core::{FeatureStyleInfo, SymbolInfo, TileMetadata};
use tilepipe_geometry::{Coord, Geometry};

/// Paints tiles as VML markup for old Internet Explorer clients.
///
/// VML paths take integer coordinates only. Point styles are written once as
/// a `vml:shapetype`, every point is a `vml:shape` of that type.
pub struct VmlTilePainter;

impl TilePainter for VmlTilePainter {
	fn paint(&self, tile: &mut InternalTile, metadata: &TileMetadata) -> Result<()> {
		let transform = DisplayTransform::for_tile(tile, metadata);
		let prefix = escape_xml(&tile.element_id()).into_owned();
		let size = Size(tile.screen_width, tile.screen_height);
		let mut vml = String::new();
		if metadata.paint_geometries {
			write_features(&mut vml, &prefix, size, &display_features(tile, &transform)?)?;
		}
		if metadata.paint_labels {
			let style = metadata.style.label_style.clone().unwrap_or_default();
			write!(vml, r#"<vml:group id="{prefix}.labels" {size}>"#)?;
			for label in display_labels(tile, &transform) {
				let [x, y] = label.position;
				write!(
					vml,
					r#"<vml:textbox id="{prefix}.{}.label" style="position:absolute;left:{}px;top:{}px;font-size:{}px;color:{};">{}</vml:textbox>"#,
					escape_xml(&label.feature.id),
					round(x),
					round(y),
					style.font_size,
					escape_xml(&style.font_color),
					escape_xml(label.text)
				)?;
			}
			vml.push_str("</vml:group>");
		}
		tile.content = Some(TileContent::Vml(vml));
		Ok(())
	}
}

/// Tile size, written as the style and coordinate space of a group.
#[derive(Clone, Copy)]
struct Size(u32, u32);

impl fmt::Display for Size {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			r#"style="width:{0}px;height:{1}px;" coordsize="{0},{1}""#,
			self.0, self.1
		)
	}
}

fn round(value: f64) -> i64 {
	value.round() as i64
}

fn paint_attributes(style: &FeatureStyleInfo, filled: bool) -> Result<String, fmt::Error> {
	let mut attributes = format!(
		r#"filled="{}" fillcolor="{}" strokecolor="{}" strokeweight="{}px"><vml:fill opacity="{}"/><vml:stroke opacity="{}""#,
		if filled { "t" } else { "f" },
		escape_xml(&style.fill_color),
		escape_xml(&style.stroke_color),
		style.stroke_width,
		style.fill_opacity,
		style.stroke_opacity
	);
	if let Some(dash) = &style.dash_array {
		write!(attributes, r#" dashstyle="{}""#, escape_xml(dash))?;
	}
	attributes.push_str("/>");
	Ok(attributes)
}

fn shapetype_id(prefix: &str, index: u32) -> String {
	format!("{prefix}.symbol.{index}")
}

fn symbol_size(symbol: &SymbolInfo) -> (i64, i64) {
	match symbol {
		SymbolInfo::Circle { radius } => (round(radius * 2.0), round(radius * 2.0)),
		SymbolInfo::Rect { width, height } => (round(*width), round(*height)),
	}
}

fn write_features(vml: &mut String, prefix: &str, size: Size, features: &[DisplayFeature]) -> Result<()> {
	write!(vml, r#"<vml:group id="{prefix}.features" {size}>"#)?;

	let shapetypes: BTreeMap<u32, &FeatureStyleInfo> = features
		.iter()
		.filter(|f| point_coords(&f.geometry).is_some())
		.map(|f| (f.style.index, f.style.as_ref()))
		.rev()
		.collect();
	for (index, style) in &shapetypes {
		let symbol = style.point_symbol();
		let (width, height) = symbol_size(&symbol);
		let path = match symbol {
			SymbolInfo::Circle { .. } => format!("ar 0,0,{width},{height},0,0,0,0 x e"),
			SymbolInfo::Rect { .. } => format!("m 0,0 l {width},0,{width},{height},0,{height} x e"),
		};
		write!(
			vml,
			r#"<vml:shapetype id="{}" coordsize="{width},{height}" path="{path}" {}</vml:shapetype>"#,
			shapetype_id(prefix, *index),
			paint_attributes(style, true)?
		)?;
	}

	for feature in features {
		let id = escape_xml(&feature.feature.id);
		if let Some(points) = point_coords(&feature.geometry) {
			let (width, height) = symbol_size(&feature.style.point_symbol());
			write!(vml, r#"<vml:group id="{prefix}.{id}" {size}>"#)?;
			for point in points {
				write!(
					vml,
					r##"<vml:shape type="#{}" style="position:absolute;left:{}px;top:{}px;width:{width}px;height:{height}px;"/>"##,
					shapetype_id(prefix, feature.style.index),
					round(point.x) - width / 2,
					round(point.y) - height / 2
				)?;
			}
			vml.push_str("</vml:group>");
		} else {
			let filled = !matches!(feature.geometry, Geometry::LineString(_) | Geometry::MultiLineString(_));
			write!(
				vml,
				r#"<vml:shape id="{prefix}.{id}" {size} path="{}" {}</vml:shape>"#,
				path_data(&feature.geometry)?,
				paint_attributes(&feature.style, filled)?
			)?;
		}
	}
	vml.push_str("</vml:group>");
	Ok(())
}

fn push_path(path: &mut String, coords: &[Coord<f64>], close: bool) -> fmt::Result {
	for (index, c) in coords.iter().enumerate() {
		match index {
			0 => path.push_str("m "),
			1 => path.push_str(" l "),
			_ => path.push(','),
		}
		write!(path, "{},{}", round(c.x), round(c.y))?;
	}
	if close && !coords.is_empty() {
		path.push_str(" x");
	}
	if !coords.is_empty() {
		path.push(' ');
	}
	Ok(())
}

fn path_data(geometry: &Geometry) -> Result<String, fmt::Error> {
	let mut path = String::new();
	match geometry {
		Geometry::LineString(l) => push_path(&mut path, &l.0, false)?,
		Geometry::MultiLineString(m) => {
			for l in m {
				push_path(&mut path, &l.0, false)?;
			}
		}
		Geometry::Polygon(p) => {
			for r in rings(p) {
				push_path(&mut path, open_ring(r), true)?;
			}
		}
		Geometry::MultiPolygon(m) => {
			for r in m.iter().flat_map(rings) {
				push_path(&mut path, open_ring(r), true)?;
			}
		}
		Geometry::Point(_) | Geometry::MultiPoint(_) | Geometry::Collection(_) => {}
	}
	path.push('e');
	Ok(path)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::InternalFeature;
	use pretty_assertions::assert_eq;
	use tilepipe_core::{Bbox, TileCode};

	fn tile(features: Vec<(&str, Geometry)>) -> InternalTile {
		let mut tile = InternalTile::new("beans", TileCode::new(1, 1, 0).unwrap(), "EPSG:4326");
		tile.bounds = Bbox::new(0.0, 0.0, 20.0, 20.0).unwrap();
		tile.screen_width = 200;
		tile.screen_height = 200;
		tile.features = features
			.into_iter()
			.map(|(id, geometry)| {
				let mut feature = InternalFeature::new(id, "beans");
				feature.geometry = Some(geometry);
				feature.label = Some(id.to_uppercase());
				feature
			})
			.collect();
		tile
	}

	fn paint(tile: &mut InternalTile, metadata: &TileMetadata) -> String {
		VmlTilePainter.paint(tile, metadata).unwrap();
		match &tile.content {
			Some(TileContent::Vml(vml)) => vml.clone(),
			other => panic!("unexpected content {other:?}"),
		}
	}

	fn metadata() -> TileMetadata {
		TileMetadata::new("beans", "EPSG:4326", TileCode::new(1, 1, 0).unwrap(), 10.0)
	}

	#[test]
	fn line() {
		let mut tile = tile(vec![("line", Geometry::new_line_string(vec![[0.0, 5.0], [10.0, 5.0], [10.0, 6.04]]))]);
		assert_eq!(
			paint(&mut tile, &metadata()),
			concat!(
				r#"<vml:group id="beans.1-1-0.features" style="width:200px;height:200px;" coordsize="200,200">"#,
				r#"<vml:shape id="beans.1-1-0.line" style="width:200px;height:200px;" coordsize="200,200" "#,
				r##"path="m 0,150 l 100,150,100,140 e" filled="f" fillcolor="#ffffff" strokecolor="#000000" "##,
				r#"strokeweight="1px"><vml:fill opacity="0.5"/><vml:stroke opacity="1"/></vml:shape>"#,
				"</vml:group>"
			)
		);
	}

	#[test]
	fn dashed_multi_lines() {
		let mut tile = tile(vec![(
			"lines",
			Geometry::new_multi_line_string(vec![vec![[0.0, 5.0], [10.0, 5.0]], vec![[0.0, 10.0], [5.0, 10.0]]]),
		)]);
		tile.features[0].style = Some(FeatureStyleInfo {
			dash_array: Some("4,2".to_string()),
			..FeatureStyleInfo::default()
		});
		let vml = paint(&mut tile, &metadata());
		assert!(vml.contains(r#"path="m 0,150 l 100,150 m 0,100 l 50,100 e" filled="f""#));
		assert!(vml.contains(r#"<vml:stroke opacity="1" dashstyle="4,2"/></vml:shape>"#));
	}

	#[test]
	fn polygons_are_closed_and_filled() {
		let mut tile = tile(vec![(
			"square",
			Geometry::from_bbox(&Bbox::new(0.0, 0.0, 5.0, 5.0).unwrap()),
		)]);
		let vml = paint(&mut tile, &metadata());
		assert!(vml.contains(r#"path="m 50,200 l 50,150,0,150,0,200 x e" filled="t""#));
	}

	#[test]
	fn points_use_a_shapetype() {
		let mut tile = tile(vec![(
			"many",
			Geometry::new_multi_point(vec![[1.0, 1.0], [2.0, 2.0]]),
		)]);
		let vml = paint(&mut tile, &metadata());
		assert_eq!(vml.matches("<vml:shapetype ").count(), 1);
		assert!(vml.contains(r#"<vml:shapetype id="beans.1-1-0.symbol.0" coordsize="10,10" path="ar 0,0,10,10,0,0,0,0 x e""#));
		assert!(vml.contains(concat!(
			r##"<vml:group id="beans.1-1-0.many" style="width:200px;height:200px;" coordsize="200,200">"##,
			r##"<vml:shape type="#beans.1-1-0.symbol.0" style="position:absolute;left:5px;top:185px;width:10px;height:10px;"/>"##,
			r##"<vml:shape type="#beans.1-1-0.symbol.0" style="position:absolute;left:15px;top:175px;width:10px;height:10px;"/>"##,
			"</vml:group>"
		)));
	}

	#[test]
	fn labels() {
		let mut tile = tile(vec![("p", Geometry::new_point([1.0, 1.0]))]);
		let mut metadata = metadata();
		metadata.paint_geometries = false;
		metadata.paint_labels = true;
		assert_eq!(
			paint(&mut tile, &metadata),
			concat!(
				r#"<vml:group id="beans.1-1-0.labels" style="width:200px;height:200px;" coordsize="200,200">"#,
				r#"<vml:textbox id="beans.1-1-0.p.label" style="position:absolute;left:10px;top:190px;font-size:12px;color:#000000;">P</vml:textbox>"#,
				"</vml:group>"
			)
		);
	}
}
