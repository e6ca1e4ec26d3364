//! Pipeline errors

use mkb_generate::GenerationError;
use mkb_store::StoreError;
use thiserror::Error;

/// Errors escaping an agent or the pipeline.
///
/// The research and synthesis stages swallow generation failures into
/// persisted fallback or error documents, so the pipeline itself surfaces
/// only store I/O. `Generation` escapes from the maintenance operations
/// that have no document to degrade into.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Store operation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generation failed where no fallback artifact applies
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
