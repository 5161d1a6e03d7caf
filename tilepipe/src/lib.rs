//! Renders secured vector map tiles from a YAML configuration.
//!
//! [`config::Config`] describes the layers, who may see what of them, which
//! rendering strategy handles which request and whether rendered tiles are
//! cached. [`Config::build_services`](config::Config::build_services) wires
//! these into the [`command::GetRenderedTileCommand`], the entry point for
//! rendering one tile.

pub mod command;
pub mod config;
