use crate::{PipelineContext, PipelineError, PipelineInfo, PipelineName, PipelineRegistry, StepRef};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Resolves and runs pipelines.
pub struct PipelineService<Req, Resp> {
	registry: Arc<PipelineRegistry<Req, Resp>>,
}

impl<Req, Resp> Clone for PipelineService<Req, Resp> {
	fn clone(&self) -> Self {
		PipelineService {
			registry: Arc::clone(&self.registry),
		}
	}
}

impl<Req, Resp> PipelineService<Req, Resp> {
	#[must_use]
	pub fn new(registry: Arc<PipelineRegistry<Req, Resp>>) -> Self {
		PipelineService { registry }
	}

	#[must_use]
	pub fn registry(&self) -> &PipelineRegistry<Req, Resp> {
		&self.registry
	}

	/// The pipeline registered for `name` and `layer_id`, falling back to the
	/// one registered for `name` alone.
	///
	/// # Errors
	/// [`PipelineError::Unknown`] if neither exists.
	pub fn get_pipeline(&self, name: &PipelineName, layer_id: Option<&str>) -> Result<Arc<PipelineInfo<Req, Resp>>> {
		if let Some(layer_id) = layer_id {
			if let Some(info) = self.registry.get(name, Some(layer_id)) {
				return Ok(info);
			}
			log::debug!("no pipeline '{name}' for layer '{layer_id}', using the default one");
		}
		self.registry.get(name, None).ok_or_else(|| {
			PipelineError::Unknown {
				name: name.to_string(),
				layer_id: layer_id.map(str::to_string),
			}
			.into()
		})
	}

	#[must_use]
	pub fn create_context(&self) -> PipelineContext {
		PipelineContext::new()
	}

	/// Run `pipeline` with a fresh context.
	pub fn execute(&self, pipeline: &PipelineInfo<Req, Resp>, request: &Req, response: &mut Resp) -> Result<()> {
		let mut context = self.create_context();
		self.execute_with_context(pipeline, request, &mut context, response)
	}

	/// Resolve the pipeline for `name` and `layer_id` and run it.
	pub fn execute_named(
		&self,
		name: &PipelineName,
		layer_id: Option<&str>,
		request: &Req,
		response: &mut Resp,
	) -> Result<()> {
		let pipeline = self.get_pipeline(name, layer_id)?;
		self.execute(&pipeline, request, response)
	}

	/// Run `pipeline` with a context the caller may have seeded.
	///
	/// Steps run in order until one fails or marks the context as finished.
	/// The error of a failing step is returned with the step id attached as
	/// context; the original error stays reachable with `downcast_ref`.
	pub fn execute_with_context(
		&self,
		pipeline: &PipelineInfo<Req, Resp>,
		request: &Req,
		context: &mut PipelineContext,
		response: &mut Resp,
	) -> Result<()> {
		let ranges = pipeline.intercepted_ranges()?;
		let steps = pipeline.steps();
		let mut ranges = ranges.into_iter().peekable();
		let mut index = 0;
		while index < steps.len() && !context.is_finished() {
			if let Some(range) = ranges.next_if(|r| r.first == index) {
				let interceptor = range.interceptor;
				log::trace!("pipeline {}: interceptor '{}' before steps", pipeline.name(), interceptor.id());
				let mode = interceptor
					.before_steps(request, context, response)
					.with_context(|| format!("interceptor '{}' of pipeline {pipeline:?} failed", interceptor.id()))?;
				if mode.execute_steps() {
					for step in &steps[range.first..=range.last] {
						if context.is_finished() {
							break;
						}
						run_step(pipeline, step, request, context, response)?;
					}
				}
				if mode.execute_after() {
					log::trace!("pipeline {}: interceptor '{}' after steps", pipeline.name(), interceptor.id());
					interceptor
						.after_steps(request, context, response)
						.with_context(|| format!("interceptor '{}' of pipeline {pipeline:?} failed", interceptor.id()))?;
				}
				index = range.last + 1;
			} else {
				run_step(pipeline, &steps[index], request, context, response)?;
				index += 1;
			}
		}
		Ok(())
	}
}

fn run_step<Req, Resp>(
	pipeline: &PipelineInfo<Req, Resp>,
	step: &StepRef<Req, Resp>,
	request: &Req,
	context: &mut PipelineContext,
	response: &mut Resp,
) -> Result<()> {
	log::trace!("pipeline {}: step '{}'", pipeline.name(), step.id());
	step
		.execute(request, context, response)
		.with_context(|| format!("step '{}' of pipeline {pipeline:?} failed", step.id()))
}
