//! Tile rendering on top of the pipeline engine.
//!
//! The `getVectorTile` and `getRasterTile` pipelines turn a
//! [`TileMetadata`](tilepipe_core::TileMetadata) into an [`InternalTile`]:
//! they compose the feature filter, fetch and clip the features of a
//! [`VectorLayer`] and paint them as SVG, VML or PNG. A
//! [`RenderingStrategyFactory`](strategy::RenderingStrategyFactory) decides
//! per request which of the two pipelines runs.

mod cache;
mod error;
pub mod keys;
mod layer;
pub mod paint;
mod security;
pub mod steps;
pub mod strategy;
mod tile;

#[cfg(test)]
pub(crate) mod test_utils;

pub use cache::*;
pub use error::*;
pub use layer::*;
pub use security::*;
pub use tile::*;
