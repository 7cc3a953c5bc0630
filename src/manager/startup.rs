use super::registry::ComponentRegistry;
use super::types::{InitReport, PublishFailure};
use super::ComponentManager;
use crate::component::Component;
use crate::error::{ManagerError, Result};
use crate::lifecycle::LifecycleState;
use crate::management::{ManagedObject, ObjectName};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Object name plus whatever it displaced
type Published = (ObjectName, Option<Arc<dyn ManagedObject>>);

/// What an initialization attempt has done so far
#[derive(Default)]
struct Attempt {
    initialized: Vec<Arc<dyn Component>>,
    published: Vec<Published>,
}

impl ComponentManager {
    /// Discover, initialize and register every component, publishing their
    /// management objects.
    ///
    /// Repeated calls after a successful one are no-ops. A discovery error
    /// leaves the manager `Initializing` since no component was touched. A
    /// failing `init` or a duplicate name aborts the whole call: components
    /// already initialized are shut down, published objects are rolled back
    /// to their previous holders and the manager is `Dead`.
    pub fn initialize(&self) -> Result<InitReport> {
        let _transition = self.transition.lock();
        let state = self.state.load();
        match state {
            LifecycleState::Initializing => {}
            LifecycleState::Dead => {
                return Err(ManagerError::illegal_state("initialize", state));
            }
            LifecycleState::Startable | LifecycleState::Stoppable => {
                debug!("Component manager already initialized, ignoring initialize");
                return Ok(InitReport::default());
            }
        }

        info!("Initializing components");
        let components = self.source.discover().map_err(|e| {
            error!("Component discovery failed: {}", e);
            ManagerError::Discovery(e)
        })?;

        let mut attempt = Attempt::default();
        let (registry, report) = match self.register_all(components, &mut attempt) {
            Ok(done) => done,
            Err(e) => {
                error!("Component initialization aborted: {}", e);
                self.abort(attempt);
                return Err(e);
            }
        };

        if self.registry.set(registry).is_err() {
            self.abort(attempt);
            return Err(ManagerError::illegal_state("initialize", state));
        }
        let next = self.state.advance(state);

        if report.is_clean() {
            info!(
                "Initialized {} components, published {} management objects",
                report.components, report.published
            );
        } else {
            info!(
                "Initialized {} components, published {} management objects ({} failed)",
                report.components,
                report.published,
                report.publish_failures.len()
            );
        }
        debug!("Component manager is now {}", next);
        Ok(report)
    }

    fn register_all(
        &self,
        components: Vec<Arc<dyn Component>>,
        attempt: &mut Attempt,
    ) -> Result<(ComponentRegistry, InitReport)> {
        let mut registry = ComponentRegistry::default();
        let mut report = InitReport::default();

        for component in components {
            let name = component.name().to_string();
            info!("Initialization of component {} started", name);
            component.init().map_err(|source| ManagerError::ComponentInit {
                component: name.clone(),
                source,
            })?;
            attempt.initialized.push(Arc::clone(&component));
            info!("Initialization of component {} completed", name);

            registry.insert(Arc::clone(&component))?;
            report.components += 1;

            self.publish(component.as_ref(), &mut report, &mut attempt.published);
        }

        Ok((registry, report))
    }

    /// Undo an initialization attempt and retire the manager.
    fn abort(&self, attempt: Attempt) {
        // Newest first so a name published twice ends with its original holder
        for (name, previous) in attempt.published.into_iter().rev() {
            let restored = match previous {
                Some(previous) => self.management.replace(name.clone(), previous).map(|_| ()),
                None => self.management.unregister(&name).map(|_| ()),
            };
            if let Err(e) = restored {
                debug!("Could not roll back management object {}: {}", name, e);
            }
        }

        for component in &attempt.initialized {
            info!("Shutdown of component {} after aborted initialization", component.name());
            if let Err(e) = component.shutdown() {
                error!(
                    "Failed to shut down component {} after aborted initialization: {}",
                    component.name(),
                    e
                );
            }
        }

        self.state.terminate();
        debug!("Component manager is now {}", LifecycleState::Dead);
    }

    /// Publish a component's management objects. Failures are recorded in
    /// `report` and never abort initialization.
    fn publish(
        &self,
        component: &dyn Component,
        report: &mut InitReport,
        published: &mut Vec<Published>,
    ) {
        let objects = match component.management_objects() {
            Ok(objects) => objects,
            Err(e) => {
                error!(
                    "Component {} failed to list its management objects: {}",
                    component.name(),
                    e
                );
                report.publish_failures.push(PublishFailure {
                    component: component.name().to_string(),
                    object: None,
                    reason: e.to_string(),
                });
                return;
            }
        };

        for (raw_name, object) in objects {
            match self.publish_one(&raw_name, object) {
                Ok((name, previous)) => {
                    info!(
                        "Registering of component {} and management object {} completed",
                        component.name(),
                        name
                    );
                    published.push((name, previous));
                    report.published += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to register management object {} for component {}: {}",
                        raw_name,
                        component.name(),
                        e
                    );
                    report.publish_failures.push(PublishFailure {
                        component: component.name().to_string(),
                        object: Some(raw_name),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn publish_one(&self, raw_name: &str, object: Arc<dyn ManagedObject>) -> Result<Published> {
        let name = ObjectName::parse(raw_name)?;
        let previous = self.management.replace(name.clone(), object)?;
        Ok((name, previous))
    }

    /// Start every registered component in registration order.
    ///
    /// The first failure aborts the remaining starts. The manager moves to
    /// `Stoppable` either way so that `shutdown` reaches every component.
    pub fn start(&self) -> Result<()> {
        let _transition = self.transition.lock();
        let state = self.state.load();
        if state != LifecycleState::Startable {
            return Err(ManagerError::illegal_state("start", state));
        }
        let registry = self
            .registry
            .get()
            .ok_or_else(|| ManagerError::illegal_state("start", state))?;

        info!("Starting {} components", registry.len());
        let result: Result<()> = registry.iter().try_for_each(|component| {
            info!("Start of component {} starting", component.name());
            component.start().map_err(|source| {
                error!("Failed to start component {}: {}", component.name(), source);
                ManagerError::ComponentStart {
                    component: component.name().to_string(),
                    source,
                }
            })?;
            info!("Start of component {} completed", component.name());
            Ok(())
        });

        self.state.advance(state);
        if result.is_ok() {
            info!("All components started successfully");
        }
        result
    }
}
