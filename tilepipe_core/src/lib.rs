//! Value types shared by every tilepipe crate: tile codes and their fetch
//! ordering, tile grids, request metadata and feature styles.

pub mod style;
pub mod types;

pub use style::*;
pub use types::*;
