//! Geometries, features and the OGC-style filter predicates evaluated over them.

mod crs;
mod feature;
pub mod filter;
mod geometry;

pub use crs::*;
pub use feature::*;
pub use filter::{DefaultFilterService, Filter, FilterParseError, FilterService, parse_filter};
pub use geometry::*;
