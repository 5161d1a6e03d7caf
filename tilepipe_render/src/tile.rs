use image::ImageFormat;
use std::fmt;
use tilepipe_core::{Bbox, FeatureStyleInfo, TileCode};
use tilepipe_geometry::{Attributes, Geometry};

/// A feature prepared for painting.
#[derive(Clone, Debug, PartialEq)]
pub struct InternalFeature {
	pub id: String,
	pub layer_id: String,
	pub attributes: Attributes,
	/// Geometry in the CRS of the tile.
	pub geometry: Option<Geometry>,
	/// Part of `geometry` inside the tile, set when the feature crosses the tile border.
	pub clipped_geometry: Option<Geometry>,
	pub style: Option<FeatureStyleInfo>,
	pub label: Option<String>,
}

impl InternalFeature {
	#[must_use]
	pub fn new(id: &str, layer_id: &str) -> Self {
		InternalFeature {
			id: id.to_string(),
			layer_id: layer_id.to_string(),
			attributes: Attributes::new(),
			geometry: None,
			clipped_geometry: None,
			style: None,
			label: None,
		}
	}

	#[must_use]
	pub fn is_clipped(&self) -> bool {
		self.clipped_geometry.is_some()
	}

	/// The geometry to draw.
	#[must_use]
	pub fn display_geometry(&self) -> Option<&Geometry> {
		self.clipped_geometry.as_ref().or(self.geometry.as_ref())
	}
}

/// Painted content of a tile.
#[derive(Clone, PartialEq)]
pub enum TileContent {
	Svg(String),
	Vml(String),
	Image { format: ImageFormat, data: Vec<u8> },
}

impl TileContent {
	#[must_use]
	pub fn content_type(&self) -> &'static str {
		match self {
			TileContent::Svg(_) => "image/svg+xml",
			TileContent::Vml(_) => "application/vnd.ms-vml",
			TileContent::Image { format, .. } => format.to_mime_type(),
		}
	}

	#[must_use]
	pub fn as_bytes(&self) -> &[u8] {
		match self {
			TileContent::Svg(text) | TileContent::Vml(text) => text.as_bytes(),
			TileContent::Image { data, .. } => data,
		}
	}
}

impl fmt::Debug for TileContent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({} bytes)", self.content_type(), self.as_bytes().len())
	}
}

/// The result of a tile pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct InternalTile {
	pub layer_id: String,
	pub code: TileCode,
	/// CRS identifier of the request.
	pub crs: String,
	/// Tile area in the CRS of the request.
	pub bounds: Bbox,
	pub screen_width: u32,
	pub screen_height: u32,
	pub features: Vec<InternalFeature>,
	pub content: Option<TileContent>,
	/// `true` if at least one feature was clipped to the tile.
	pub clipped: bool,
}

impl InternalTile {
	/// An empty tile; bounds and size are set by the tile filter step.
	#[must_use]
	pub fn new(layer_id: &str, code: TileCode, crs: &str) -> Self {
		InternalTile {
			layer_id: layer_id.to_string(),
			code,
			crs: crs.to_string(),
			bounds: Bbox {
				x_min: 0.0,
				y_min: 0.0,
				x_max: 0.0,
				y_max: 0.0,
			},
			screen_width: 0,
			screen_height: 0,
			features: Vec::new(),
			content: None,
			clipped: false,
		}
	}

	/// Prefix of all element ids written by the painters, `layer.code`.
	#[must_use]
	pub fn element_id(&self) -> String {
		format!("{}.{}", self.layer_id, self.code)
	}
}
