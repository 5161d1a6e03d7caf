use thiserror::Error;

/// Failures of required [`PipelineContext`](crate::PipelineContext) lookups.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContextError {
	#[error("pipeline context has no value for key '{key}'")]
	KeyMissing { key: String },

	#[error("pipeline context value for key '{key}' is a {actual}, expected {expected}")]
	TypeMismatch {
		key: String,
		expected: &'static str,
		actual: &'static str,
	},
}

/// Failures of pipeline resolution.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PipelineError {
	#[error("no pipeline '{name}' registered for layer {layer_id:?}")]
	Unknown { name: String, layer_id: Option<String> },
}
