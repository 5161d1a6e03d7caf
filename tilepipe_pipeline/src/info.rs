use crate::{PipelineInterceptor, PipelineStep};
use anyhow::{Context, Result, bail, ensure};
use itertools::Itertools;
use std::{fmt, sync::Arc};

/// Name of a pipeline, e.g. `getVectorTile`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineName(String);

impl PipelineName {
	#[must_use]
	pub fn new(name: &str) -> Self {
		PipelineName(name.to_string())
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for PipelineName {
	fn from(value: &str) -> Self {
		PipelineName::new(value)
	}
}

impl fmt::Display for PipelineName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

pub type StepRef<Req, Resp> = Arc<dyn PipelineStep<Req, Resp>>;
pub type InterceptorRef<Req, Resp> = Arc<dyn PipelineInterceptor<Req, Resp>>;

/// Run of steps an interceptor wraps, as inclusive step indices.
pub struct InterceptedRange<'a, Req, Resp> {
	pub first: usize,
	pub last: usize,
	pub interceptor: &'a InterceptorRef<Req, Resp>,
}

/// Ordered steps plus interceptors, registered under a name and optionally a layer.
pub struct PipelineInfo<Req, Resp> {
	name: PipelineName,
	layer_id: Option<String>,
	steps: Vec<StepRef<Req, Resp>>,
	interceptors: Vec<InterceptorRef<Req, Resp>>,
}

impl<Req, Resp> Clone for PipelineInfo<Req, Resp> {
	fn clone(&self) -> Self {
		PipelineInfo {
			name: self.name.clone(),
			layer_id: self.layer_id.clone(),
			steps: self.steps.clone(),
			interceptors: self.interceptors.clone(),
		}
	}
}

impl<Req: 'static, Resp: 'static> PipelineInfo<Req, Resp> {
	#[must_use]
	pub fn new(name: impl Into<PipelineName>) -> Self {
		PipelineInfo {
			name: name.into(),
			layer_id: None,
			steps: Vec::new(),
			interceptors: Vec::new(),
		}
	}

	/// Restrict the pipeline to one layer.
	#[must_use]
	pub fn for_layer(mut self, layer_id: &str) -> Self {
		self.layer_id = Some(layer_id.to_string());
		self
	}

	#[must_use]
	pub fn with_step(mut self, step: impl PipelineStep<Req, Resp> + 'static) -> Self {
		self.steps.push(Arc::new(step));
		self
	}

	#[must_use]
	pub fn with_interceptor(mut self, interceptor: impl PipelineInterceptor<Req, Resp> + 'static) -> Self {
		self.interceptors.push(Arc::new(interceptor));
		self
	}

	/// Copy of this pipeline for `layer_id`, sharing the step instances.
	#[must_use]
	pub fn derive_for_layer(&self, layer_id: &str) -> Self {
		self.clone().for_layer(layer_id)
	}

	fn position(&self, step_id: &str) -> Result<usize> {
		self.steps
			.iter()
			.position(|s| s.id() == step_id)
			.with_context(|| format!("pipeline '{}' has no step '{step_id}'", self.name))
	}

	/// Insert `step` directly after the step with id `step_id`.
	pub fn insert_after(mut self, step_id: &str, step: impl PipelineStep<Req, Resp> + 'static) -> Result<Self> {
		let index = self.position(step_id)?;
		self.steps.insert(index + 1, Arc::new(step));
		Ok(self)
	}

	/// Replace the step with id `step_id`.
	pub fn replace(mut self, step_id: &str, step: impl PipelineStep<Req, Resp> + 'static) -> Result<Self> {
		let index = self.position(step_id)?;
		self.steps[index] = Arc::new(step);
		Ok(self)
	}
}

impl<Req, Resp> PipelineInfo<Req, Resp> {
	#[must_use]
	pub fn name(&self) -> &PipelineName {
		&self.name
	}

	#[must_use]
	pub fn layer_id(&self) -> Option<&str> {
		self.layer_id.as_deref()
	}

	#[must_use]
	pub fn steps(&self) -> &[StepRef<Req, Resp>] {
		&self.steps
	}

	#[must_use]
	pub fn step_ids(&self) -> Vec<&str> {
		self.steps.iter().map(|s| s.id()).collect()
	}

	/// Resolve the step runs of all interceptors, ordered by their first step.
	///
	/// Fails if an interceptor names an unknown step, its run is reversed,
	/// or two runs overlap.
	pub fn intercepted_ranges(&self) -> Result<Vec<InterceptedRange<'_, Req, Resp>>> {
		let find = |id: Option<&str>, default: usize| -> Result<usize> {
			match id {
				None => Ok(default),
				Some(id) => self
					.steps
					.iter()
					.position(|s| s.id() == id)
					.with_context(|| format!("pipeline '{}' has no step '{id}'", self.name)),
			}
		};
		let mut ranges = Vec::with_capacity(self.interceptors.len());
		for interceptor in &self.interceptors {
			if self.steps.is_empty() {
				bail!("interceptor '{}' wraps the steps of an empty pipeline", interceptor.id());
			}
			let first = find(interceptor.from_step(), 0)?;
			let last = find(interceptor.to_step(), self.steps.len() - 1)?;
			ensure!(
				first <= last,
				"interceptor '{}' ends before it starts",
				interceptor.id()
			);
			ranges.push(InterceptedRange {
				first,
				last,
				interceptor,
			});
		}
		ranges.sort_by_key(|r| r.first);
		for (a, b) in ranges.iter().tuple_windows() {
			ensure!(
				a.last < b.first,
				"interceptors '{}' and '{}' overlap",
				a.interceptor.id(),
				b.interceptor.id()
			);
		}
		Ok(ranges)
	}
}

impl<Req, Resp> fmt::Debug for PipelineInfo<Req, Resp> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name)?;
		if let Some(layer_id) = &self.layer_id {
			write!(f, ".{layer_id}")?;
		}
		write!(f, " [{}]", self.steps.iter().map(|s| s.id()).join(", "))?;
		if !self.interceptors.is_empty() {
			write!(f, " ({})", self.interceptors.iter().map(|i| i.id()).join(", "))?;
		}
		Ok(())
	}
}
