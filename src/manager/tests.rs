use super::*;
use crate::component::{Component, ManagementObjects};
use crate::config::ManagerConfig;
use crate::discovery::{ComponentCatalog, ComponentSource, StaticSource};
use crate::error::{ComponentError, ManagerError};
use crate::lifecycle::LifecycleState;
use crate::management::{
    Access, AttributeTable, AttributeValue, ManagedObject, ManagementRegistry, ObjectName,
};
use parking_lot::Mutex;
use std::sync::Arc;

type Journal = Arc<Mutex<Vec<String>>>;

const CFG_OBJECT: &str = "ns:type=Cfg";

/// Component that records every hook call and can be told to fail
struct TestComponent {
    name: String,
    journal: Journal,
    fail_init: bool,
    fail_start: bool,
    fail_shutdown: bool,
    fail_objects: bool,
    objects: Vec<(String, Arc<AttributeTable>)>,
}

impl TestComponent {
    fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: Arc::clone(journal),
            fail_init: false,
            fail_start: false,
            fail_shutdown: false,
            fail_objects: false,
            objects: Vec::new(),
        }
    }

    fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    fn failing_shutdown(mut self) -> Self {
        self.fail_shutdown = true;
        self
    }

    fn failing_objects(mut self) -> Self {
        self.fail_objects = true;
        self
    }

    fn with_object(mut self, name: &str, value: i32) -> Self {
        let table = AttributeTable::builder(format!("{} settings", self.name))
            .attribute("Value", value, Access::ReadWrite, "Test value")
            .build();
        self.objects.push((name.to_string(), Arc::new(table)));
        self
    }

    fn record(&self, hook: &str, fail: bool) -> Result<(), ComponentError> {
        self.journal.lock().push(format!("{}:{}", hook, self.name));
        if fail {
            Err(ComponentError::new(format!("{} of {} failed", hook, self.name)))
        } else {
            Ok(())
        }
    }
}

impl Component for TestComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&self) -> Result<(), ComponentError> {
        self.record("init", self.fail_init)
    }

    fn start(&self) -> Result<(), ComponentError> {
        self.record("start", self.fail_start)
    }

    fn shutdown(&self) -> Result<(), ComponentError> {
        self.record("shutdown", self.fail_shutdown)
    }

    fn management_objects(&self) -> Result<ManagementObjects, ComponentError> {
        if self.fail_objects {
            return Err(ComponentError::new("object listing failed"));
        }
        Ok(self
            .objects
            .iter()
            .map(|(name, table)| {
                let object: Arc<dyn ManagedObject> = table.clone();
                (name.clone(), object)
            })
            .collect())
    }
}

/// Counter component: 111 once started, -1 after shutdown
struct CfgComponent {
    table: Arc<AttributeTable>,
}

impl CfgComponent {
    fn new() -> Self {
        Self {
            table: Arc::new(
                AttributeTable::builder("Dummy configuration")
                    .attribute("Count", 0, Access::ReadWrite, "Current count")
                    .build(),
            ),
        }
    }
}

impl Component for CfgComponent {
    fn name(&self) -> &str {
        "A"
    }

    fn init(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    fn start(&self) -> Result<(), ComponentError> {
        self.table.update("Count", 111)?;
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ComponentError> {
        self.table.update("Count", -1)?;
        Ok(())
    }

    fn management_objects(&self) -> Result<ManagementObjects, ComponentError> {
        let mut objects = ManagementObjects::new();
        objects.insert(CFG_OBJECT.to_string(), self.table.clone());
        Ok(objects)
    }
}

struct FailingSource;

impl ComponentSource for FailingSource {
    fn discover(&self) -> Result<Vec<Arc<dyn Component>>, ComponentError> {
        Err(ComponentError::new("component directory unreadable"))
    }
}

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().clone()
}

fn manager_with(components: Vec<TestComponent>) -> ComponentManager {
    let source = components
        .into_iter()
        .fold(StaticSource::default(), |source, c| source.with(c));
    ComponentManager::new(source)
}

fn assert_illegal<T: std::fmt::Debug>(result: crate::error::Result<T>, operation: &str) {
    match result {
        Err(ManagerError::IllegalStateTransition { operation: op, .. }) => assert_eq!(op, operation),
        other => panic!("Expected illegal {} transition, got {:?}", operation, other),
    }
}

#[test]
fn test_full_lifecycle_in_discovery_order() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal),
        TestComponent::new("cache", &journal),
    ]);
    assert_eq!(manager.state(), LifecycleState::Initializing);

    let report = manager.initialize().unwrap();
    assert_eq!(report.components, 2);
    assert_eq!(manager.state(), LifecycleState::Startable);

    manager.start().unwrap();
    assert_eq!(manager.state(), LifecycleState::Stoppable);

    let report = manager.shutdown().unwrap();
    assert!(report.is_clean());
    assert_eq!(report.attempted, 2);
    assert_eq!(manager.state(), LifecycleState::Dead);

    assert_eq!(
        entries(&journal),
        vec![
            "init:pool",
            "init:cache",
            "start:pool",
            "start:cache",
            "shutdown:pool",
            "shutdown:cache",
        ]
    );
}

#[test]
fn test_start_before_initialize_fails() {
    let journal = journal();
    let manager = manager_with(vec![TestComponent::new("pool", &journal)]);

    assert_illegal(manager.start(), "start");
    assert_illegal(manager.shutdown(), "shutdown");
    assert_eq!(manager.state(), LifecycleState::Initializing);
    assert!(entries(&journal).is_empty());
}

#[test]
fn test_start_twice_fails() {
    let journal = journal();
    let manager = manager_with(vec![TestComponent::new("pool", &journal)]);
    manager.initialize().unwrap();
    manager.start().unwrap();

    assert_illegal(manager.start(), "start");
    assert_eq!(entries(&journal), vec!["init:pool", "start:pool"]);
}

#[test]
fn test_initialize_twice_is_noop() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal).with_object("app:type=Pool", 1),
    ]);

    let first = manager.initialize().unwrap();
    let second = manager.initialize().unwrap();

    assert_eq!(first.components, 1);
    assert_eq!(second, InitReport::default());
    assert_eq!(manager.state(), LifecycleState::Startable);
    assert_eq!(manager.component_names().unwrap(), vec!["pool"]);
    assert_eq!(entries(&journal), vec!["init:pool"]);

    // Still a no-op once started
    manager.start().unwrap();
    assert!(manager.initialize().is_ok());
    assert_eq!(manager.state(), LifecycleState::Stoppable);
}

#[test]
fn test_component_lookup() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal),
        TestComponent::new("cache", &journal),
        TestComponent::new("exporter", &journal),
    ]);
    manager.initialize().unwrap();

    for name in ["pool", "cache", "exporter"] {
        let component = manager.component(name).unwrap();
        assert_eq!(component.map(|c| c.name().to_string()), Some(name.to_string()));
    }
    assert!(manager.component("scheduler").unwrap().is_none());
}

#[test]
fn test_queries_before_initialize_fail() {
    let manager = manager_with(Vec::new());

    assert_illegal(manager.component("pool"), "component");
    assert_illegal(manager.management_attribute(CFG_OBJECT, "Count"), "management_attribute");
    assert_illegal(manager.management_info(CFG_OBJECT), "management_info");
}

#[test]
fn test_duplicate_name_aborts_initialize() {
    let journal = journal();
    let registry = Arc::new(ManagementRegistry::new());
    let source = StaticSource::default()
        .with(TestComponent::new("pool", &journal).with_object("app:type=Pool", 1))
        .with(TestComponent::new("pool", &journal).with_object("app:type=Other", 2));
    let manager = ComponentManager::with_registry(source, Arc::clone(&registry));

    match manager.initialize() {
        Err(ManagerError::DuplicateComponentName(name)) => assert_eq!(name, "pool"),
        other => panic!("Expected duplicate name error, got {:?}", other),
    }

    assert_eq!(manager.state(), LifecycleState::Dead);
    // Both instances passed init, so both are shut down again
    assert_eq!(
        entries(&journal),
        vec!["init:pool", "init:pool", "shutdown:pool", "shutdown:pool"]
    );
    // Nothing from the aborted attempt stays published
    assert!(registry.is_empty());
    assert_illegal(manager.component("pool"), "component");
    assert_illegal(manager.start(), "start");
}

#[test]
fn test_init_failure_aborts_remaining_components() {
    let journal = journal();
    let registry = Arc::new(ManagementRegistry::new());
    let source = StaticSource::default()
        .with(TestComponent::new("pool", &journal).with_object("app:type=Pool", 1))
        .with(TestComponent::new("cache", &journal).failing_init())
        .with(TestComponent::new("exporter", &journal));
    let manager = ComponentManager::with_registry(source, Arc::clone(&registry));

    match manager.initialize() {
        Err(ManagerError::ComponentInit { component, source }) => {
            assert_eq!(component, "cache");
            assert_eq!(source.message(), "init of cache failed");
        }
        other => panic!("Expected init failure, got {:?}", other),
    }

    assert_eq!(
        entries(&journal),
        vec!["init:pool", "init:cache", "shutdown:pool"]
    );
    assert_eq!(manager.state(), LifecycleState::Dead);
    assert!(registry.is_empty());
}

#[test]
fn test_aborted_initialize_never_reinitializes() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal),
        TestComponent::new("pool", &journal),
    ]);

    assert!(matches!(
        manager.initialize(),
        Err(ManagerError::DuplicateComponentName(_))
    ));
    assert_illegal(manager.initialize(), "initialize");
    assert_illegal(manager.shutdown(), "shutdown");

    let inits = entries(&journal)
        .iter()
        .filter(|entry| entry.starts_with("init:"))
        .count();
    assert_eq!(inits, 2);
}

#[test]
fn test_aborted_initialize_restores_shared_objects() {
    let registry = Arc::new(ManagementRegistry::new());
    let journal = journal();

    let first = ComponentManager::with_registry(
        StaticSource::default().with(TestComponent::new("pool", &journal).with_object("app:type=Pool", 1)),
        Arc::clone(&registry),
    );
    first.initialize().unwrap();
    first.start().unwrap();

    let second = ComponentManager::with_registry(
        StaticSource::default()
            .with(TestComponent::new("pool", &journal).with_object("app:type=Pool", 2))
            .with(TestComponent::new("fresh", &journal).with_object("app:type=Fresh", 3))
            .with(TestComponent::new("cache", &journal).failing_init()),
        Arc::clone(&registry),
    );
    assert!(matches!(
        second.initialize(),
        Err(ManagerError::ComponentInit { .. })
    ));

    // The live manager still serves its own object, and the new name is gone
    assert_eq!(
        first.management_attribute("app:type=Pool", "Value").unwrap(),
        AttributeValue::Int(1)
    );
    assert_eq!(registry.len(), 1);
    assert!(!registry.contains(&ObjectName::parse("app:type=Fresh").unwrap()));

    first.shutdown().unwrap();
}

#[test]
fn test_discovery_failure_is_fatal() {
    let manager = ComponentManager::new(FailingSource);
    match manager.initialize() {
        Err(ManagerError::Discovery(e)) => assert_eq!(e.message(), "component directory unreadable"),
        other => panic!("Expected discovery failure, got {:?}", other),
    }
    assert_eq!(manager.state(), LifecycleState::Initializing);
}

#[test]
fn test_publish_failures_are_isolated() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal)
            .with_object("not-an-object-name", 1)
            .with_object("app:type=Pool", 2),
        TestComponent::new("cache", &journal).failing_objects(),
        TestComponent::new("exporter", &journal).with_object("app:type=Exporter", 3),
    ]);

    let report = manager.initialize().unwrap();
    assert_eq!(manager.state(), LifecycleState::Startable);
    assert_eq!(report.components, 3);
    assert_eq!(report.published, 2);
    assert_eq!(report.publish_failures.len(), 2);

    let malformed = &report.publish_failures[0];
    assert_eq!(malformed.component, "pool");
    assert_eq!(malformed.object.as_deref(), Some("not-an-object-name"));
    let listing = &report.publish_failures[1];
    assert_eq!(listing.component, "cache");
    assert_eq!(listing.object, None);

    // Every component is still registered and the valid objects are readable
    assert!(manager.component("cache").unwrap().is_some());
    assert_eq!(
        manager.management_attribute("app:type=Pool", "Value").unwrap(),
        AttributeValue::Int(2)
    );
    assert_eq!(
        manager.management_attribute("app:type=Exporter", "Value").unwrap(),
        AttributeValue::Int(3)
    );
}

#[test]
fn test_start_failure_still_allows_shutdown() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal),
        TestComponent::new("cache", &journal).failing_start(),
        TestComponent::new("exporter", &journal),
    ]);
    manager.initialize().unwrap();

    match manager.start() {
        Err(ManagerError::ComponentStart { component, .. }) => assert_eq!(component, "cache"),
        other => panic!("Expected start failure, got {:?}", other),
    }
    assert_eq!(manager.state(), LifecycleState::Stoppable);

    let report = manager.shutdown().unwrap();
    assert_eq!(report.attempted, 3);
    assert_eq!(manager.state(), LifecycleState::Dead);

    assert_eq!(
        entries(&journal),
        vec![
            "init:pool",
            "init:cache",
            "init:exporter",
            "start:pool",
            "start:cache",
            // exporter never started but is still shut down
            "shutdown:pool",
            "shutdown:cache",
            "shutdown:exporter",
        ]
    );
}

#[test]
fn test_shutdown_sweeps_past_failures() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal).failing_shutdown(),
        TestComponent::new("cache", &journal),
        TestComponent::new("exporter", &journal).failing_shutdown(),
    ]);
    manager.initialize().unwrap();
    manager.start().unwrap();

    let report = manager.shutdown().unwrap();
    assert_eq!(report.attempted, 3);
    assert_eq!(report.exit_code(), 1);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.component.as_str()).collect();
    assert_eq!(failed, vec!["pool", "exporter"]);
    assert_eq!(manager.state(), LifecycleState::Dead);
    assert_eq!(
        entries(&journal)[6..],
        ["shutdown:pool", "shutdown:cache", "shutdown:exporter"]
    );
}

#[test]
fn test_everything_fails_once_dead() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal).with_object("app:type=Pool", 1),
    ]);
    manager.initialize().unwrap();
    manager.start().unwrap();
    manager.shutdown().unwrap();

    assert_illegal(manager.initialize(), "initialize");
    assert_illegal(manager.start(), "start");
    assert_illegal(manager.shutdown(), "shutdown");
    assert_illegal(manager.component("pool"), "component");
    assert_illegal(manager.component_names(), "component_names");
    assert_illegal(manager.management_attribute("app:type=Pool", "Value"), "management_attribute");
    assert_illegal(manager.management_info("app:type=Pool"), "management_info");
    assert_illegal(
        manager.set_management_attribute("app:type=Pool", "Value", AttributeValue::Int(5)),
        "set_management_attribute",
    );
    assert_illegal(manager.query_names("app:*"), "query_names");
    assert_illegal(manager.snapshot(), "snapshot");
    assert_eq!(manager.state(), LifecycleState::Dead);
}

#[test]
fn test_counter_component_end_to_end() {
    let component = CfgComponent::new();
    let table = Arc::clone(&component.table);
    let manager = ComponentManager::new(StaticSource::default().with(component));

    manager.initialize().unwrap();
    manager.start().unwrap();

    assert!(manager.component("A").unwrap().is_some());

    let info = manager.management_info(CFG_OBJECT).unwrap();
    assert!(info.attribute("Count").is_some());
    assert_eq!(
        manager.management_attribute(CFG_OBJECT, "Count").unwrap(),
        AttributeValue::Int(111)
    );

    manager.shutdown().unwrap();
    // Queries are closed once dead; check the component's own table instead
    assert_eq!(table.get("Count"), Some(AttributeValue::Int(-1)));
}

#[test]
fn test_query_misses() {
    let manager = ComponentManager::new(StaticSource::default().with(CfgComponent::new()));
    manager.initialize().unwrap();

    match manager.management_attribute("ns:type=Missing", "Count") {
        Err(ManagerError::UnknownManagementObject(name)) => assert_eq!(name, "ns:type=Missing"),
        other => panic!("Expected unknown object, got {:?}", other),
    }
    match manager.management_attribute(CFG_OBJECT, "Size") {
        Err(ManagerError::UnknownAttribute { object, attribute }) => {
            assert_eq!(object, CFG_OBJECT);
            assert_eq!(attribute, "Size");
        }
        other => panic!("Expected unknown attribute, got {:?}", other),
    }
    assert!(matches!(
        manager.management_info("ns:type=Missing"),
        Err(ManagerError::UnknownManagementObject(_))
    ));
    assert!(matches!(
        manager.management_attribute("no separator", "Count"),
        Err(ManagerError::MalformedObjectName { .. })
    ));
}

#[test]
fn test_set_management_attribute() {
    let component = CfgComponent::new();
    let table = Arc::clone(&component.table);
    let manager = ComponentManager::new(StaticSource::default().with(component));
    manager.initialize().unwrap();

    manager
        .set_management_attribute(CFG_OBJECT, "Count", AttributeValue::Int(7))
        .unwrap();
    assert_eq!(table.get("Count"), Some(AttributeValue::Int(7)));

    assert!(matches!(
        manager.set_management_attribute(CFG_OBJECT, "Count", AttributeValue::Text("7".into())),
        Err(ManagerError::AttributeTypeMismatch { .. })
    ));
}

#[test]
fn test_repeated_runs_replace_published_objects() {
    let registry = Arc::new(ManagementRegistry::new());
    let journal = journal();

    let first = ComponentManager::with_registry(
        StaticSource::default().with(TestComponent::new("pool", &journal).with_object("app:type=Pool", 1)),
        Arc::clone(&registry),
    );
    first.initialize().unwrap();
    first.start().unwrap();
    first.shutdown().unwrap();

    let second = ComponentManager::with_registry(
        StaticSource::default().with(TestComponent::new("pool", &journal).with_object("app:type=Pool", 2)),
        Arc::clone(&registry),
    );
    let report = second.initialize().unwrap();
    assert!(report.is_clean());
    assert_eq!(registry.len(), 1);
    assert_eq!(
        second.management_attribute("app:type=Pool", "Value").unwrap(),
        AttributeValue::Int(2)
    );
}

#[test]
fn test_query_names_and_snapshot() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal)
            .with_object("app:type=Pool,name=primary", 1)
            .with_object("app:type=Pool,name=replica", 2),
        TestComponent::new("cache", &journal).with_object("app:type=Cache", 3),
    ]);
    manager.initialize().unwrap();

    let pools = manager.query_names("app:type=Pool,*").unwrap();
    assert_eq!(pools.len(), 2);
    assert!(pools.contains(&ObjectName::parse("app:name=replica,type=Pool").unwrap()));

    let snapshot = manager.snapshot().unwrap();
    assert_eq!(snapshot.len(), 3);
    let json = serde_json::to_value(&snapshot).unwrap();
    let cache = json
        .as_array()
        .unwrap()
        .iter()
        .find(|object| object["name"] == "app:type=Cache")
        .unwrap();
    assert_eq!(cache["values"]["Value"], 3);
    assert_eq!(cache["info"]["attributes"][0]["type"], "Int");
}

#[test]
fn test_concurrent_queries() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal).with_object("app:type=Pool", 42),
    ]);
    manager.initialize().unwrap();
    manager.start().unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    assert!(manager.component("pool").unwrap().is_some());
                    assert_eq!(
                        manager.management_attribute("app:type=Pool", "Value").unwrap(),
                        AttributeValue::Int(42)
                    );
                }
            });
        }
    });

    manager.shutdown().unwrap();
}

#[test]
fn test_concurrent_transitions_run_each_hook_once() {
    let journal = journal();
    let manager = manager_with(vec![
        TestComponent::new("pool", &journal).with_object("app:type=Pool", 1),
        TestComponent::new("cache", &journal),
        TestComponent::new("exporter", &journal),
    ]);

    let started = std::sync::atomic::AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                manager.initialize().unwrap();
                match manager.start() {
                    Ok(()) => {
                        started.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    }
                    Err(e) => assert!(e.is_illegal_state(), "Unexpected error: {}", e),
                }
            });
        }
    });

    assert_eq!(started.into_inner(), 1);
    assert_eq!(manager.state(), LifecycleState::Stoppable);
    let recorded = entries(&journal);
    for hook in ["init", "start"] {
        for name in ["pool", "cache", "exporter"] {
            let entry = format!("{}:{}", hook, name);
            assert_eq!(
                recorded.iter().filter(|e| **e == entry).count(),
                1,
                "{} should run exactly once",
                entry
            );
        }
    }

    manager.shutdown().unwrap();
}

#[test]
fn test_builtin_components_through_catalog() {
    let mut config = ManagerConfig::default();
    config.management.domain = "svc".to_string();
    config.heartbeat.interval_ms = 10;

    let source = ComponentCatalog::builtin().source(config).unwrap();
    let manager = ComponentManager::new(source);

    let report = manager.initialize().unwrap();
    assert!(report.is_clean());
    assert_eq!(manager.component_names().unwrap(), vec!["runtime", "heartbeat"]);

    manager.start().unwrap();
    assert_eq!(
        manager.management_attribute("svc:type=Heartbeat", "Running").unwrap(),
        AttributeValue::Bool(true)
    );
    assert_eq!(
        manager.management_attribute("svc:type=Runtime", "Components").unwrap(),
        AttributeValue::Int(2)
    );

    let report = manager.shutdown().unwrap();
    assert!(report.is_clean());
}
