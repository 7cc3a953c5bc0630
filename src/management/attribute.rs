use crate::error::AttributeError;
use serde::Serialize;
use std::fmt;

/// Value held by a management attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Text(String),
}

impl AttributeValue {
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::Bool(_) => AttributeType::Bool,
            Self::Int(_) => AttributeType::Int,
            Self::Long(_) => AttributeType::Long,
            Self::Double(_) => AttributeType::Double,
            Self::Text(_) => AttributeType::Text,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of `Int` and `Long` values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(i64::from(*v)),
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttributeType {
    Bool,
    Int,
    Long,
    Double,
    Text,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

impl Access {
    pub fn is_writable(self) -> bool {
        self == Self::ReadWrite
    }
}

/// Introspection metadata for one attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub access: Access,
    pub description: String,
}

/// Introspection metadata for a whole management object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagementInfo {
    pub description: String,
    pub attributes: Vec<AttributeInfo>,
}

impl ManagementInfo {
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Name of the first attribute declared more than once, if any
    pub fn duplicate_attribute(&self) -> Option<&str> {
        self.attributes
            .iter()
            .enumerate()
            .find(|(i, a)| self.attributes[..*i].iter().any(|b| b.name == a.name))
            .map(|(_, a)| a.name.as_str())
    }
}

/// Object exposing named attributes to management tooling
pub trait ManagedObject: Send + Sync {
    fn info(&self) -> ManagementInfo;

    fn get_attribute(&self, name: &str) -> Result<AttributeValue, AttributeError>;

    fn set_attribute(&self, name: &str, value: AttributeValue) -> Result<(), AttributeError>;
}

/// Check `value` against the declared type of `info`
pub fn check_type(info: &AttributeInfo, value: &AttributeValue) -> Result<(), AttributeError> {
    if value.attribute_type() == info.attribute_type {
        Ok(())
    } else {
        Err(AttributeError::TypeMismatch {
            attribute: info.name.clone(),
            expected: info.attribute_type.to_string(),
            found: value.attribute_type().to_string(),
        })
    }
}
