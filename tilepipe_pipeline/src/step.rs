use crate::PipelineContext;
use anyhow::Result;

/// One unit of work in a pipeline.
///
/// A step reads the request, reads and writes the context, and fills in the
/// response. Returning an error aborts the pipeline; the remaining steps do
/// not run.
pub trait PipelineStep<Req, Resp>: Send + Sync {
	/// Identifier, unique within one pipeline.
	fn id(&self) -> &str;

	fn execute(&self, request: &Req, context: &mut PipelineContext, response: &mut Resp) -> Result<()>;
}
