//! Configuration of a tilepipe renderer.
//!
//! - [`Config`]: top-level loader and YAML parser
//! - [`LayerConfig`]: a layer with its grid, styles and inline features
//! - [`LayerSecurityConfig`]: what may be seen of a layer
//! - [`RenderingConfig`]: rules choosing the rendering strategy
//! - [`CacheConfig`]: the rendered tile cache

mod cache;
mod layer;
mod main;
mod rendering;
mod security;

pub use cache::CacheConfig;
pub use layer::LayerConfig;
pub use main::Config;
pub use rendering::{RenderingConfig, RuleConfig};
pub use security::LayerSecurityConfig;
