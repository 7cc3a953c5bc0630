use crate::component::Component;
use crate::config::ManagerConfig;
use crate::error::{ComponentError, ManagerError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Supplier of the components the manager drives.
///
/// `discover` is called once per initialization attempt and should hand back
/// fresh instances in the order they are to be initialized and started.
pub trait ComponentSource: Send + Sync {
    fn discover(&self) -> std::result::Result<Vec<Arc<dyn Component>>, ComponentError>;
}

/// Fixed list of already-constructed components
#[derive(Default)]
pub struct StaticSource {
    components: Vec<Arc<dyn Component>>,
}

impl StaticSource {
    pub fn new(components: Vec<Arc<dyn Component>>) -> Self {
        Self { components }
    }

    pub fn with<C: Component + 'static>(mut self, component: C) -> Self {
        self.components.push(Arc::new(component));
        self
    }
}

impl ComponentSource for StaticSource {
    fn discover(&self) -> std::result::Result<Vec<Arc<dyn Component>>, ComponentError> {
        Ok(self.components.clone())
    }
}

type Factory = Arc<dyn Fn(&ManagerConfig) -> Arc<dyn Component> + Send + Sync>;

/// Named component factories, selected by configuration
#[derive(Clone, Default)]
pub struct ComponentCatalog {
    factories: Vec<(String, Factory)>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the components shipped in this crate
    pub fn builtin() -> Self {
        Self::new()
            .register("heartbeat", |config| {
                Arc::new(crate::components::Heartbeat::from_config(config))
            })
            .register("runtime", |config| {
                Arc::new(crate::components::RuntimeInfo::from_config(config))
            })
    }

    /// Add a factory under `kind`, replacing any previous one
    pub fn register<F>(mut self, kind: &str, factory: F) -> Self
    where
        F: Fn(&ManagerConfig) -> Arc<dyn Component> + Send + Sync + 'static,
    {
        self.factories.retain(|(k, _)| k != kind);
        self.factories.push((kind.to_string(), Arc::new(factory)));
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(|(k, _)| k.as_str())
    }

    fn factory(&self, kind: &str) -> Option<&Factory> {
        self.factories.iter().find(|(k, _)| k == kind).map(|(_, f)| f)
    }

    /// Bind the catalog to a configuration. Every enabled kind must exist.
    pub fn source(self, config: ManagerConfig) -> Result<CatalogSource> {
        if let Some(unknown) = config
            .components
            .enabled
            .iter()
            .find(|kind| self.factory(kind).is_none())
        {
            return Err(ManagerError::UnknownComponentKind(unknown.clone()));
        }

        info!(
            "Component catalog bound with {} enabled components: {:?}",
            config.components.enabled.len(),
            config.components.enabled
        );
        Ok(CatalogSource {
            catalog: self,
            config,
        })
    }
}

/// Configuration-driven source that builds the enabled components in the
/// order they are listed
pub struct CatalogSource {
    catalog: ComponentCatalog,
    config: ManagerConfig,
}

impl ComponentSource for CatalogSource {
    fn discover(&self) -> std::result::Result<Vec<Arc<dyn Component>>, ComponentError> {
        self.config
            .components
            .enabled
            .iter()
            .map(|kind| -> std::result::Result<Arc<dyn Component>, ComponentError> {
                let factory = self
                    .catalog
                    .factory(kind)
                    .ok_or_else(|| ComponentError::new(format!("unknown component kind {}", kind)))?;
                debug!("Constructing component of kind {}", kind);
                Ok(factory(&self.config))
            })
            .collect()
    }
}
