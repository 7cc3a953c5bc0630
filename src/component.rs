use crate::error::ComponentError;
use crate::management::ManagedObject;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Management objects exposed by a component, keyed by object name string
pub type ManagementObjects = BTreeMap<String, Arc<dyn ManagedObject>>;

/// Lifecycle contract every managed unit implements.
///
/// The manager calls each hook at most once, in the order
/// `init` → `start` → `shutdown`. Hooks take `&self`, so components keep
/// their mutable state behind interior mutability.
pub trait Component: Send + Sync {
    /// Stable identifier, unique across every component in the process
    fn name(&self) -> &str;

    /// One-time setup. A failure aborts initialization of the whole manager.
    fn init(&self) -> Result<(), ComponentError>;

    /// One-time activation. A failure stops the remaining components from
    /// being started, but shutdown still runs for all of them.
    fn start(&self) -> Result<(), ComponentError>;

    /// One-time teardown. Failures are logged by the manager and never
    /// propagated.
    fn shutdown(&self) -> Result<(), ComponentError>;

    /// Objects to publish in the management registry, called once after
    /// `init` succeeds.
    fn management_objects(&self) -> Result<ManagementObjects, ComponentError> {
        Ok(ManagementObjects::new())
    }
}

impl std::fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component").field("name", &self.name()).finish()
    }
}
