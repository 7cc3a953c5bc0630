use crate::component::Component;
use crate::error::{ManagerError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Components keyed by name, iterated in registration order
#[derive(Default)]
pub(crate) struct ComponentRegistry {
    components: Vec<Arc<dyn Component>>,
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    pub(crate) fn insert(&mut self, component: Arc<dyn Component>) -> Result<()> {
        let name = component.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ManagerError::DuplicateComponentName(name));
        }
        self.index.insert(name, self.components.len());
        self.components.push(component);
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.index
            .get(name)
            .and_then(|&i| self.components.get(i))
            .cloned()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<dyn Component>> {
        self.components.iter()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.components.iter().map(|c| c.name().to_string()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.components.len()
    }
}
