//! Commands run against a configured renderer.

mod get_rendered_tile;

pub use get_rendered_tile::{GetRenderedTileCommand, RenderedTileRequest, RenderedTileResponse};

use std::sync::Arc;
use tilepipe_render::strategy::{RenderServices, RenderingStrategyFactory};

/// Everything the commands need, built by [`Config::build_services`](crate::config::Config::build_services).
#[derive(Clone)]
pub struct CommandServices {
	pub render: RenderServices,
	pub strategies: Arc<RenderingStrategyFactory>,
}
