//! Scan pipeline for the locker gate.
//!
//! This crate wires the gate's stages together:
//!
//! 1. [`KeyEventDecoder`] rebuilds a QR payload from scanner key events
//! 2. [`DebounceFilter`] drops repeats inside the cooldown window
//! 3. [`CredentialResolver`] looks the payload up in the credential store
//! 4. [`SecurityPolicy`] authorizes LOW credentials and asks the operator
//!    about HIGH ones
//! 5. [`CommandDispatcher`] writes the locker command to the actuator
//! 6. [`AuditLogger`] appends the access to the audit store
//!
//! [`ScanPipeline`] owns all of them and processes one token at a time.

pub mod audit;
pub mod debounce;
pub mod decoder;
pub mod dispatcher;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod resolver;

pub use audit::AuditLogger;
pub use debounce::{DebounceDecision, DebounceFilter};
pub use decoder::KeyEventDecoder;
pub use dispatcher::CommandDispatcher;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{AuditOrder, PipelineConfig, PipelineStats, ScanOutcome, ScanPipeline};
pub use policy::{
    DenialReason, PolicyDecision, PolicyState, PolicyTransition, SecurityPolicy, is_confirmation,
};
pub use resolver::CredentialResolver;
