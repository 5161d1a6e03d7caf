//! Feature styles as configured per layer.
//!
//! A [`NamedStyle`] is an ordered list of [`FeatureStyleInfo`]s. A feature
//! takes the first style whose `formula` matches it (a style without a
//! formula matches everything).

use serde::Deserialize;
use std::hash::{Hash, Hasher};

/// Named collection of feature styles plus an optional label style.
///
/// Hashes cover the whole content, not just the name.
#[derive(Clone, Debug, Default, PartialEq, Hash, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedStyle {
	pub name: String,
	#[serde(default)]
	pub feature_styles: Vec<FeatureStyleInfo>,
	#[serde(default)]
	pub label_style: Option<LabelStyle>,
}

impl NamedStyle {
	#[must_use]
	pub fn new(name: &str, feature_styles: Vec<FeatureStyleInfo>) -> Self {
		NamedStyle {
			name: name.to_string(),
			feature_styles,
			label_style: None,
		}
	}

	/// Style with the given index, if configured.
	#[must_use]
	pub fn feature_style(&self, index: u32) -> Option<&FeatureStyleInfo> {
		self.feature_styles.iter().find(|s| s.index == index)
	}
}

/// Symbol used to draw point features.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum SymbolInfo {
	Circle { radius: f64 },
	Rect { width: f64, height: f64 },
}

/// Hashes the bits of a float, with `-0.0` folded into `0.0` to stay consistent with `==`.
fn hash_float<H: Hasher>(value: f64, state: &mut H) {
	(value + 0.0).to_bits().hash(state);
}

impl Hash for SymbolInfo {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			SymbolInfo::Circle { radius } => hash_float(*radius, state),
			SymbolInfo::Rect { width, height } => {
				hash_float(*width, state);
				hash_float(*height, state);
			}
		}
	}
}

/// Drawing style of one class of features.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureStyleInfo {
	pub index: u32,
	pub name: String,
	/// Filter expression selecting the features drawn with this style.
	pub formula: Option<String>,
	pub fill_color: String,
	pub fill_opacity: f32,
	pub stroke_color: String,
	pub stroke_opacity: f32,
	pub stroke_width: f32,
	pub dash_array: Option<String>,
	pub symbol: Option<SymbolInfo>,
}

impl Default for FeatureStyleInfo {
	fn default() -> Self {
		FeatureStyleInfo {
			index: 0,
			name: String::from("default"),
			formula: None,
			fill_color: String::from("#ffffff"),
			fill_opacity: 0.5,
			stroke_color: String::from("#000000"),
			stroke_opacity: 1.0,
			stroke_width: 1.0,
			dash_array: None,
			symbol: None,
		}
	}
}

impl Hash for FeatureStyleInfo {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.index.hash(state);
		self.name.hash(state);
		self.formula.hash(state);
		self.fill_color.hash(state);
		hash_float(f64::from(self.fill_opacity), state);
		self.stroke_color.hash(state);
		hash_float(f64::from(self.stroke_opacity), state);
		hash_float(f64::from(self.stroke_width), state);
		self.dash_array.hash(state);
		self.symbol.hash(state);
	}
}

impl FeatureStyleInfo {
	/// The symbol drawn for points, a 5 pixel circle unless configured.
	#[must_use]
	pub fn point_symbol(&self) -> SymbolInfo {
		self.symbol.clone().unwrap_or(SymbolInfo::Circle { radius: 5.0 })
	}

	/// Inline CSS used by the SVG painter.
	#[must_use]
	pub fn to_css(&self) -> String {
		let mut css = format!(
			"fill:{};fill-opacity:{};stroke:{};stroke-opacity:{};stroke-width:{};",
			self.fill_color, self.fill_opacity, self.stroke_color, self.stroke_opacity, self.stroke_width
		);
		if let Some(dash) = &self.dash_array {
			css.push_str(&format!("stroke-dasharray:{dash};"));
		}
		css
	}
}

/// How labels are written.
#[derive(Clone, Debug, PartialEq, Hash, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelStyle {
	/// Attribute path whose value becomes the label.
	pub attribute: String,
	pub font_color: String,
	pub font_size: u32,
}

impl Default for LabelStyle {
	fn default() -> Self {
		LabelStyle {
			attribute: String::from("name"),
			font_color: String::from("#000000"),
			font_size: 12,
		}
	}
}
