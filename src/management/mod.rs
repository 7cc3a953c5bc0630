//! Runtime-introspectable attributes published by components.
//!
//! Components hand the manager a map of object name strings to
//! [`ManagedObject`] holders during initialization. The manager parses each
//! name into an [`ObjectName`] and publishes the holder in a shared
//! [`ManagementRegistry`], where management tooling can read and write the
//! named attributes until shutdown.

mod attribute;
mod object_name;
mod registry;
mod table;

pub use attribute::{
    check_type, Access, AttributeInfo, AttributeType, AttributeValue, ManagedObject,
    ManagementInfo,
};
pub use object_name::ObjectName;
pub use registry::{ManagementRegistry, ObjectSnapshot};
pub use table::{AttributeTable, AttributeTableBuilder};
