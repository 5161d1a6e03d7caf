use thiserror::Error;
use tilepipe_core::TileCode;
use tilepipe_geometry::GeometryType;

/// Why a tile could not be rendered.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RenderErrorKind {
	#[error("geometry type {0} can not be painted")]
	UnsupportedGeometry(GeometryType),

	#[error("no rendering strategy '{0}' is registered")]
	NoStrategy(String),

	#[error("encoding failed: {0}")]
	Encoding(String),

	#[error("transformation failed: {0}")]
	Transform(String),

	#[error("pipeline '{0}' failed")]
	Pipeline(String),
}

/// A tile-level rendering failure, tagged with the layer and tile it happened on.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("can not render tile {code} of layer '{layer_id}': {kind}")]
pub struct RenderError {
	pub layer_id: String,
	pub code: TileCode,
	pub kind: RenderErrorKind,
}

impl RenderError {
	#[must_use]
	pub fn new(layer_id: &str, code: TileCode, kind: RenderErrorKind) -> Self {
		RenderError {
			layer_id: layer_id.to_string(),
			code,
			kind,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn message_names_layer_and_tile() {
		let error = RenderError::new(
			"beans",
			TileCode::new(3, 2, 1).unwrap(),
			RenderErrorKind::Encoding("png".to_string()),
		);
		assert_eq!(
			error.to_string(),
			"can not render tile 3-2-1 of layer 'beans': encoding failed: png"
		);
	}
}
