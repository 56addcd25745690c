use crate::error::ModelError;
use crate::types::{ModelOutput, ModelRequest, ModelTask};

/// Anything that can answer a model request.
///
/// Implementations are synchronous; async callers run them on a blocking
/// thread.
pub trait Responder: Send + Sync {
    fn respond(&self, request: &ModelRequest) -> Result<ModelOutput, ModelError>;

    /// Tasks this responder answers.
    fn tasks(&self) -> &[ModelTask] {
        &ModelTask::ALL
    }
}
