//! A generic chain-of-responsibility engine.
//!
//! A pipeline is an ordered list of [`PipelineStep`]s that all work on the
//! same request, a shared [`PipelineContext`] and a response. Pipelines are
//! registered by name, optionally per layer, in a [`PipelineRegistry`] and
//! executed through the [`PipelineService`].

mod context;
mod error;
mod info;
mod interceptor;
mod registry;
mod service;
mod step;

pub use context::*;
pub use error::*;
pub use info::*;
pub use interceptor::*;
pub use registry::*;
pub use service::*;
pub use step::*;
