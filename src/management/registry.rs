use super::attribute::{AttributeValue, ManagedObject, ManagementInfo};
use super::object_name::ObjectName;
use crate::error::{ManagerError, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// In-process registry of management objects keyed by object name
#[derive(Default)]
pub struct ManagementRegistry {
    objects: RwLock<BTreeMap<ObjectName, Arc<dyn ManagedObject>>>,
}

/// Point-in-time view of one registered object
#[derive(Debug, Clone, Serialize)]
pub struct ObjectSnapshot {
    pub name: ObjectName,
    pub info: ManagementInfo,
    pub values: BTreeMap<String, AttributeValue>,
}

impl ManagementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `object` under `name`. Fails if the name is already taken.
    pub fn register(&self, name: ObjectName, object: Arc<dyn ManagedObject>) -> Result<()> {
        Self::check(&name, object.as_ref())?;

        let mut objects = self.objects.write();
        if objects.contains_key(&name) {
            return Err(ManagerError::InvalidManagedObject {
                name: name.to_string(),
                reason: "an object is already registered under this name".to_string(),
            });
        }
        debug!("Registered management object {}", name);
        objects.insert(name, object);
        Ok(())
    }

    fn check(name: &ObjectName, object: &dyn ManagedObject) -> Result<()> {
        if name.is_pattern() {
            return Err(ManagerError::InvalidManagedObject {
                name: name.to_string(),
                reason: "pattern names cannot be registered".to_string(),
            });
        }
        if let Some(duplicate) = object.info().duplicate_attribute() {
            return Err(ManagerError::InvalidManagedObject {
                name: name.to_string(),
                reason: format!("attribute {} is declared more than once", duplicate),
            });
        }
        Ok(())
    }

    pub fn unregister(&self, name: &ObjectName) -> Result<Arc<dyn ManagedObject>> {
        let removed = self
            .objects
            .write()
            .remove(name)
            .ok_or_else(|| ManagerError::UnknownManagementObject(name.to_string()))?;
        debug!("Unregistered management object {}", name);
        Ok(removed)
    }

    /// Register `object` in place of whatever holds `name`, handing back the
    /// displaced object. A rejected object leaves the previous holder in place.
    pub fn replace(
        &self,
        name: ObjectName,
        object: Arc<dyn ManagedObject>,
    ) -> Result<Option<Arc<dyn ManagedObject>>> {
        Self::check(&name, object.as_ref())?;

        let mut objects = self.objects.write();
        let previous = objects.insert(name.clone(), object);
        if previous.is_some() {
            debug!("Replaced stale management object {}", name);
        } else {
            debug!("Registered management object {}", name);
        }
        Ok(previous)
    }

    pub fn contains(&self, name: &ObjectName) -> bool {
        self.objects.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn lookup(&self, name: &ObjectName) -> Result<Arc<dyn ManagedObject>> {
        self.objects
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ManagerError::UnknownManagementObject(name.to_string()))
    }

    pub fn attribute(&self, name: &ObjectName, attribute: &str) -> Result<AttributeValue> {
        let object = self.lookup(name)?;
        object
            .get_attribute(attribute)
            .map_err(|e| ManagerError::from_attribute(&name.to_string(), e))
    }

    pub fn set_attribute(&self, name: &ObjectName, attribute: &str, value: AttributeValue) -> Result<()> {
        let object = self.lookup(name)?;
        object
            .set_attribute(attribute, value)
            .map_err(|e| ManagerError::from_attribute(&name.to_string(), e))
    }

    pub fn info(&self, name: &ObjectName) -> Result<ManagementInfo> {
        Ok(self.lookup(name)?.info())
    }

    /// Names of registered objects matching `pattern`, in canonical order
    pub fn query_names(&self, pattern: &ObjectName) -> Vec<ObjectName> {
        self.objects
            .read()
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect()
    }

    /// Info and readable values of every registered object.
    ///
    /// Attributes whose read fails are left out of `values`.
    pub fn snapshot(&self) -> Vec<ObjectSnapshot> {
        // Clone the handles first so objects are read without the registry lock
        let objects: Vec<(ObjectName, Arc<dyn ManagedObject>)> = self
            .objects
            .read()
            .iter()
            .map(|(name, object)| (name.clone(), Arc::clone(object)))
            .collect();

        objects
            .into_iter()
            .map(|(name, object)| {
                let info = object.info();
                let values = info
                    .attributes
                    .iter()
                    .filter_map(|a| {
                        object
                            .get_attribute(&a.name)
                            .ok()
                            .map(|v| (a.name.clone(), v))
                    })
                    .collect();
                ObjectSnapshot { name, info, values }
            })
            .collect()
    }
}
