mod orchestrator;
mod registry;
mod runtime;
mod shutdown;
mod startup;
mod types;

#[cfg(test)]
mod tests;

pub use orchestrator::ComponentManager;
pub use runtime::wait_for_shutdown_signal;
pub use types::{
    InitReport, PublishFailure, ShutdownFailure, ShutdownReason, ShutdownReport,
};
