mod bbox;
mod feature_include;
mod tile_code;
mod tile_code_order;
mod tile_grid;
mod tile_metadata;
mod tile_range;

pub use bbox::*;
pub use feature_include::*;
pub use tile_code::*;
pub use tile_code_order::*;
pub use tile_grid::*;
pub use tile_metadata::*;
pub use tile_range::*;
