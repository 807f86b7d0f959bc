use lockgate_hardware::HardwareError;
use lockgate_storage::StorageError;
use thiserror::Error;

/// Fatal error raised out of the scan pipeline.
///
/// Every recoverable outcome (duplicate, unknown credential, denied
/// confirmation, unmapped locker) is a [`ScanOutcome`](crate::ScanOutcome)
/// instead. Anything reaching this type stops the gate.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Scanner, actuator link or confirmation channel failed
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Credential or audit store failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Core(#[from] lockgate_core::Error),
}

impl PipelineError {
    /// Returns `true` if the scanner went away.
    pub fn is_scanner_disconnect(&self) -> bool {
        matches!(self, PipelineError::Hardware(e) if e.is_disconnect())
    }
}

/// Specialized result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
