use crate::component::{Component, ManagementObjects};
use crate::config::ManagerConfig;
use crate::error::{AttributeError, ComponentError};
use crate::management::{
    Access, AttributeInfo, AttributeType, AttributeValue, ManagedObject, ManagementInfo,
};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

const ATTRIBUTES: [(&str, AttributeType, &str); 4] = [
    ("Pid", AttributeType::Long, "Operating system process id"),
    ("StartedAt", AttributeType::Text, "RFC 3339 time the process was started"),
    ("UptimeSeconds", AttributeType::Long, "Seconds since start"),
    ("Components", AttributeType::Int, "Number of components enabled in configuration"),
];

/// Process facts whose values are computed when read
struct RuntimeStats {
    components: i32,
    started: RwLock<Option<(DateTime<Utc>, Instant)>>,
}

impl ManagedObject for RuntimeStats {
    fn info(&self) -> ManagementInfo {
        ManagementInfo {
            description: "Process runtime information".to_string(),
            attributes: ATTRIBUTES
                .iter()
                .map(|(name, attribute_type, description)| AttributeInfo {
                    name: name.to_string(),
                    attribute_type: *attribute_type,
                    access: Access::ReadOnly,
                    description: description.to_string(),
                })
                .collect(),
        }
    }

    fn get_attribute(&self, name: &str) -> Result<AttributeValue, AttributeError> {
        let started = *self.started.read();
        match name {
            "Pid" => Ok(AttributeValue::Long(i64::from(std::process::id()))),
            "StartedAt" => Ok(AttributeValue::Text(
                started
                    .map(|(at, _)| at.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .unwrap_or_default(),
            )),
            "UptimeSeconds" => {
                let secs = started.map(|(_, at)| at.elapsed().as_secs()).unwrap_or(0);
                Ok(AttributeValue::Long(i64::try_from(secs).unwrap_or(i64::MAX)))
            }
            "Components" => Ok(AttributeValue::Int(self.components)),
            other => Err(AttributeError::Unknown(other.to_string())),
        }
    }

    fn set_attribute(&self, name: &str, _value: AttributeValue) -> Result<(), AttributeError> {
        if ATTRIBUTES.iter().any(|(n, _, _)| *n == name) {
            Err(AttributeError::ReadOnly(name.to_string()))
        } else {
            Err(AttributeError::Unknown(name.to_string()))
        }
    }
}

/// Publishes `<domain>:type=Runtime` with process id and uptime
pub struct RuntimeInfo {
    object_name: String,
    stats: Arc<RuntimeStats>,
}

impl RuntimeInfo {
    pub const NAME: &'static str = "runtime";

    pub fn new(domain: &str, components: usize) -> Self {
        Self {
            object_name: format!("{}:type=Runtime", domain),
            stats: Arc::new(RuntimeStats {
                components: i32::try_from(components).unwrap_or(i32::MAX),
                started: RwLock::new(None),
            }),
        }
    }

    pub fn from_config(config: &ManagerConfig) -> Self {
        Self::new(&config.management.domain, config.components.enabled.len())
    }
}

impl Component for RuntimeInfo {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    fn start(&self) -> Result<(), ComponentError> {
        *self.stats.started.write() = Some((Utc::now(), Instant::now()));
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    fn management_objects(&self) -> Result<ManagementObjects, ComponentError> {
        let mut objects = ManagementObjects::new();
        let stats: Arc<dyn ManagedObject> = self.stats.clone();
        objects.insert(self.object_name.clone(), stats);
        Ok(objects)
    }
}
