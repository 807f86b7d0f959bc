//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware.

pub mod actuator;
pub mod confirmation;
pub mod scanner;

// Re-export commonly used types
pub use actuator::{MockActuator, MockActuatorHandle};
pub use confirmation::{MockConfirmation, MockConfirmationHandle};
pub use scanner::{MockScanner, MockScannerHandle};
