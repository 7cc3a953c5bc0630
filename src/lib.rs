pub mod component;
pub mod components;
pub mod config;
pub mod discovery;
pub mod error;
pub mod lifecycle;
pub mod management;
pub mod manager;

pub use component::{Component, ManagementObjects};
pub use components::{Heartbeat, RuntimeInfo};
pub use config::ManagerConfig;
pub use discovery::{CatalogSource, ComponentCatalog, ComponentSource, StaticSource};
pub use error::{AttributeError, ComponentError, ManagerError, Result};
pub use lifecycle::LifecycleState;
pub use management::{
    Access, AttributeInfo, AttributeTable, AttributeType, AttributeValue, ManagedObject,
    ManagementInfo, ManagementRegistry, ObjectName, ObjectSnapshot,
};
pub use manager::{
    ComponentManager, InitReport, PublishFailure, ShutdownFailure, ShutdownReason,
    ShutdownReport,
};
