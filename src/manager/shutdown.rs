use super::types::{ShutdownFailure, ShutdownReport};
use super::ComponentManager;
use crate::error::{ManagerError, Result};
use crate::lifecycle::LifecycleState;
use tracing::{error, info, warn};

impl ComponentManager {
    /// Shut down every registered component, including ones that never
    /// started.
    ///
    /// Component failures are logged and collected in the report; they never
    /// stop the sweep. The manager is `Dead` afterwards.
    pub fn shutdown(&self) -> Result<ShutdownReport> {
        let _transition = self.transition.lock();
        let state = self.state.load();
        if state != LifecycleState::Stoppable {
            return Err(ManagerError::illegal_state("shutdown", state));
        }

        info!("Beginning shutdown of components");
        let mut report = ShutdownReport::default();

        for component in self.registry.get().into_iter().flat_map(|r| r.iter()) {
            info!("Shutdown of component {} starting", component.name());
            report.attempted += 1;
            match component.shutdown() {
                Ok(()) => info!("Shutdown of component {} completed", component.name()),
                Err(e) => {
                    error!("Error shutting down component {}: {}", component.name(), e);
                    report.failures.push(ShutdownFailure {
                        component: component.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.state.advance(state);

        if report.is_clean() {
            info!("Shutdown of {} components completed", report.attempted);
        } else {
            warn!(
                "Shutdown of {} components completed with {} failures",
                report.attempted,
                report.failures.len()
            );
        }
        Ok(report)
    }
}
