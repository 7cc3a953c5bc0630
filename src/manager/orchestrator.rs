use super::registry::ComponentRegistry;
use crate::component::Component;
use crate::discovery::ComponentSource;
use crate::error::{ManagerError, Result};
use crate::lifecycle::{LifecycleState, StateCell};
use crate::management::{
    AttributeValue, ManagementInfo, ManagementRegistry, ObjectName, ObjectSnapshot,
};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// Drives every discovered component through init → start → shutdown and
/// serves lookups against the component and management registries.
///
/// `initialize`, `start` and `shutdown` hold the transition lock for their
/// whole duration. Queries read the registries without locking once
/// initialization has completed.
pub struct ComponentManager {
    pub(super) source: Box<dyn ComponentSource>,
    pub(super) management: Arc<ManagementRegistry>,
    pub(super) state: StateCell,
    pub(super) transition: Mutex<()>,
    pub(super) registry: OnceLock<ComponentRegistry>,
}

impl ComponentManager {
    /// Create a manager with its own management registry
    pub fn new<S: ComponentSource + 'static>(source: S) -> Self {
        Self::with_registry(source, Arc::new(ManagementRegistry::new()))
    }

    /// Create a manager publishing into a shared management registry
    pub fn with_registry<S: ComponentSource + 'static>(
        source: S,
        management: Arc<ManagementRegistry>,
    ) -> Self {
        Self {
            source: Box::new(source),
            management,
            state: StateCell::new(),
            transition: Mutex::new(()),
            registry: OnceLock::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state.load()
    }

    /// Registry the manager publishes management objects into
    pub fn management_registry(&self) -> Arc<ManagementRegistry> {
        Arc::clone(&self.management)
    }

    fn queryable(&self, operation: &'static str) -> Result<&ComponentRegistry> {
        let state = self.state.load();
        if !state.allows_queries() {
            return Err(ManagerError::illegal_state(operation, state));
        }
        self.registry
            .get()
            .ok_or_else(|| ManagerError::illegal_state(operation, state))
    }

    /// Look up a registered component; unknown names yield `None`
    pub fn component(&self, name: &str) -> Result<Option<Arc<dyn Component>>> {
        Ok(self.queryable("component")?.get(name))
    }

    /// Names of all registered components, in start order
    pub fn component_names(&self) -> Result<Vec<String>> {
        Ok(self.queryable("component_names")?.names())
    }

    pub fn management_attribute(&self, object: &str, attribute: &str) -> Result<AttributeValue> {
        self.queryable("management_attribute")?;
        let name = ObjectName::parse(object)?;
        self.management.attribute(&name, attribute)
    }

    pub fn set_management_attribute(
        &self,
        object: &str,
        attribute: &str,
        value: AttributeValue,
    ) -> Result<()> {
        self.queryable("set_management_attribute")?;
        let name = ObjectName::parse(object)?;
        self.management.set_attribute(&name, attribute, value)
    }

    pub fn management_info(&self, object: &str) -> Result<ManagementInfo> {
        self.queryable("management_info")?;
        let name = ObjectName::parse(object)?;
        self.management.info(&name)
    }

    /// Registered object names matching `pattern`, e.g. `app:type=Pool,*`
    pub fn query_names(&self, pattern: &str) -> Result<Vec<ObjectName>> {
        self.queryable("query_names")?;
        let pattern = ObjectName::parse(pattern)?;
        Ok(self.management.query_names(&pattern))
    }

    /// Info and current values of every registered management object
    pub fn snapshot(&self) -> Result<Vec<ObjectSnapshot>> {
        self.queryable("snapshot")?;
        Ok(self.management.snapshot())
    }
}
