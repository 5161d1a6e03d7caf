use crate::PipelineContext;
use anyhow::Result;

/// What a pipeline does after an interceptor's `before_steps`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
	/// Run the wrapped steps and `after_steps`.
	ExecuteAll,
	/// Skip the wrapped steps but still run `after_steps`.
	ExecuteSkipSteps,
	/// Skip the wrapped steps and `after_steps`.
	ExecuteNone,
}

impl ExecutionMode {
	#[must_use]
	pub fn execute_steps(self) -> bool {
		self == ExecutionMode::ExecuteAll
	}

	#[must_use]
	pub fn execute_after(self) -> bool {
		self != ExecutionMode::ExecuteNone
	}
}

/// Code that runs around a contiguous run of steps.
///
/// The run starts at the step with id [`from_step`](Self::from_step) (the
/// first step if `None`) and ends at [`to_step`](Self::to_step) (the last
/// step if `None`), both inclusive.
pub trait PipelineInterceptor<Req, Resp>: Send + Sync {
	fn id(&self) -> &str;

	fn from_step(&self) -> Option<&str> {
		None
	}

	fn to_step(&self) -> Option<&str> {
		None
	}

	fn before_steps(&self, request: &Req, context: &mut PipelineContext, response: &mut Resp) -> Result<ExecutionMode>;

	fn after_steps(&self, request: &Req, context: &mut PipelineContext, response: &mut Resp) -> Result<()>;
}
