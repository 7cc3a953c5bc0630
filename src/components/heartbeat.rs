use crate::component::{Component, ManagementObjects};
use crate::config::ManagerConfig;
use crate::error::ComponentError;
use crate::management::{Access, AttributeTable};
use crossbeam::channel::{self, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Background ticker that counts beats while the process is running.
///
/// Publishes `<domain>:type=Heartbeat` with `Count`, `Running` and
/// `IntervalMillis`. Writing `IntervalMillis` changes the pace of a running
/// ticker from the next beat on.
pub struct Heartbeat {
    object_name: String,
    table: Arc<AttributeTable>,
    worker: Mutex<Option<Worker>>,
}

struct Worker {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl Heartbeat {
    pub const NAME: &'static str = "heartbeat";

    pub fn new(domain: &str, interval: Duration) -> Self {
        let interval_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
        let table = AttributeTable::builder("Heartbeat ticker")
            .attribute("Count", 0i64, Access::ReadWrite, "Beats since start")
            .attribute("Running", false, Access::ReadOnly, "Whether the ticker is active")
            .attribute(
                "IntervalMillis",
                interval_ms,
                Access::ReadWrite,
                "Milliseconds between beats",
            )
            .build();

        Self {
            object_name: format!("{}:type=Heartbeat", domain),
            table: Arc::new(table),
            worker: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ManagerConfig) -> Self {
        Self::new(
            &config.management.domain,
            Duration::from_millis(config.heartbeat.interval_ms),
        )
    }

    /// Live attribute table shared with the management registry
    pub fn attributes(&self) -> Arc<AttributeTable> {
        Arc::clone(&self.table)
    }

    fn current_interval(table: &AttributeTable) -> Duration {
        let millis = table
            .get("IntervalMillis")
            .and_then(|v| v.as_i64())
            .unwrap_or(1000)
            .max(1);
        Duration::from_millis(u64::try_from(millis).unwrap_or(1))
    }
}

impl Component for Heartbeat {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&self) -> Result<(), ComponentError> {
        self.table.update("Count", 0i64)?;
        self.table.update("Running", false)?;
        Ok(())
    }

    fn start(&self) -> Result<(), ComponentError> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Err(ComponentError::new("heartbeat ticker already running"));
        }

        let (stop, stop_rx) = channel::bounded::<()>(0);
        let table = Arc::clone(&self.table);
        let handle = std::thread::Builder::new()
            .name("heartbeat".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(Self::current_interval(&table)) {
                    Err(RecvTimeoutError::Timeout) => {
                        if let Err(e) = table.modify_long("Count", |c| c.saturating_add(1)) {
                            warn!("Heartbeat could not update Count: {}", e);
                        }
                    }
                    // Sender dropped or stop requested
                    _ => break,
                }
            })?;

        self.table.update("Running", true)?;
        *worker = Some(Worker { stop, handle });
        info!("Heartbeat ticker started");
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ComponentError> {
        let worker = self.worker.lock().take();
        self.table.update("Running", false)?;

        match worker {
            Some(Worker { stop, handle }) => {
                drop(stop);
                handle
                    .join()
                    .map_err(|_| ComponentError::new("heartbeat thread panicked"))?;
                info!("Heartbeat ticker stopped");
            }
            None => debug!("Heartbeat ticker was never started"),
        }
        Ok(())
    }

    fn management_objects(&self) -> Result<ManagementObjects, ComponentError> {
        let mut objects = ManagementObjects::new();
        objects.insert(self.object_name.clone(), self.attributes());
        Ok(objects)
    }
}
