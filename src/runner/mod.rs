//! Setup step orchestration.

pub mod step;
pub mod workflow;

pub use step::{SetupStep, StepOutcome, StepRecord};
pub use workflow::{SetupOptions, SetupReport, SetupWorkflow};
