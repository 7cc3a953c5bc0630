use crate::lifecycle::LifecycleState;
use thiserror::Error;

/// Boxed error carried as the cause of a component failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("You are not allowed to call {operation} while the manager is {state}")]
    IllegalStateTransition {
        operation: &'static str,
        state: LifecycleState,
    },

    #[error("Component name conflict: {0} is already registered")]
    DuplicateComponentName(String),

    #[error("Initialization of component {component} failed: {source}")]
    ComponentInit {
        component: String,
        #[source]
        source: ComponentError,
    },

    #[error("Start of component {component} failed: {source}")]
    ComponentStart {
        component: String,
        #[source]
        source: ComponentError,
    },

    #[error("Component discovery failed: {0}")]
    Discovery(#[source] ComponentError),

    #[error("Malformed object name '{name}': {reason}")]
    MalformedObjectName { name: String, reason: String },

    #[error("Unknown management object: {0}")]
    UnknownManagementObject(String),

    #[error("Unknown attribute {attribute} on {object}")]
    UnknownAttribute { object: String, attribute: String },

    #[error("Attribute {attribute} on {object} is read-only")]
    ReadOnlyAttribute { object: String, attribute: String },

    #[error("Attribute {attribute} on {object} expects {expected}, got {found}")]
    AttributeTypeMismatch {
        object: String,
        attribute: String,
        expected: String,
        found: String,
    },

    #[error("Cannot register management object {name}: {reason}")]
    InvalidManagedObject { name: String, reason: String },

    #[error("Unknown component kind: {0}")]
    UnknownComponentKind(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ManagerError {
    pub fn illegal_state(operation: &'static str, state: LifecycleState) -> Self {
        Self::IllegalStateTransition { operation, state }
    }

    pub fn malformed_name<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::MalformedObjectName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Lift an attribute-level error into a manager error for the given object
    pub fn from_attribute(object: &str, error: AttributeError) -> Self {
        match error {
            AttributeError::Unknown(attribute) => Self::UnknownAttribute {
                object: object.to_string(),
                attribute,
            },
            AttributeError::ReadOnly(attribute) => Self::ReadOnlyAttribute {
                object: object.to_string(),
                attribute,
            },
            AttributeError::TypeMismatch {
                attribute,
                expected,
                found,
            } => Self::AttributeTypeMismatch {
                object: object.to_string(),
                attribute,
                expected,
                found,
            },
        }
    }

    /// True for errors raised by the lifecycle guard rather than by a component
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalStateTransition { .. })
    }
}

/// Failure reported by a component from one of its lifecycle hooks
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ComponentError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ComponentError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<BoxError>,
    {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for ComponentError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source("I/O failure", err)
    }
}

impl From<AttributeError> for ComponentError {
    fn from(err: AttributeError) -> Self {
        Self::with_source("attribute update failed", err)
    }
}

/// Failure raised by a managed object when an attribute is read or written
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    #[error("no attribute named {0}")]
    Unknown(String),

    #[error("attribute {0} is read-only")]
    ReadOnly(String),

    #[error("attribute {attribute} expects {expected}, got {found}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        found: String,
    },
}

pub type Result<T> = std::result::Result<T, ManagerError>;
