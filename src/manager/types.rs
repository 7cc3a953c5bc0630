use serde::Serialize;

/// Management object that could not be published during initialization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishFailure {
    pub component: String,
    /// Raw object name, or `None` when the component could not list its objects
    pub object: Option<String>,
    pub reason: String,
}

/// Outcome of a successful `initialize` call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InitReport {
    pub components: usize,
    pub published: usize,
    pub publish_failures: Vec<PublishFailure>,
}

impl InitReport {
    pub fn is_clean(&self) -> bool {
        self.publish_failures.is_empty()
    }
}

/// Component whose shutdown hook failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShutdownFailure {
    pub component: String,
    pub reason: String,
}

/// Outcome of the shutdown sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShutdownReport {
    pub attempted: usize,
    pub failures: Vec<ShutdownFailure>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit code: 0 for a clean sweep, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }
}

/// Why the process is shutting down
#[derive(Debug, Clone, PartialEq)]
pub enum ShutdownReason {
    Signal(String),
    UserRequest,
}
