use super::attribute::{
    check_type, Access, AttributeInfo, AttributeValue, ManagedObject, ManagementInfo,
};
use crate::error::AttributeError;
use parking_lot::RwLock;

struct Slot {
    info: AttributeInfo,
    value: RwLock<AttributeValue>,
}

/// Ready-made managed object backed by a fixed set of typed attribute cells.
///
/// A component keeps an `Arc<AttributeTable>` for its own bookkeeping and
/// publishes a clone of the same `Arc`, so management reads observe the live
/// values. The owner writes through [`AttributeTable::update`], which ignores
/// the access mode; management tooling writes through
/// [`ManagedObject::set_attribute`], which honours it.
pub struct AttributeTable {
    description: String,
    slots: Vec<Slot>,
}

impl AttributeTable {
    pub fn builder<S: Into<String>>(description: S) -> AttributeTableBuilder {
        AttributeTableBuilder {
            description: description.into(),
            slots: Vec::new(),
        }
    }

    fn slot(&self, name: &str) -> Result<&Slot, AttributeError> {
        self.slots
            .iter()
            .find(|s| s.info.name == name)
            .ok_or_else(|| AttributeError::Unknown(name.to_string()))
    }

    /// Current value of an attribute, if declared
    pub fn get(&self, name: &str) -> Option<AttributeValue> {
        self.slot(name).ok().map(|s| s.value.read().clone())
    }

    /// Owner-side write; the value type must still match the declaration
    pub fn update<V: Into<AttributeValue>>(&self, name: &str, value: V) -> Result<(), AttributeError> {
        let slot = self.slot(name)?;
        let value = value.into();
        check_type(&slot.info, &value)?;
        *slot.value.write() = value;
        Ok(())
    }

    /// Apply `f` to an integer attribute under its write lock
    pub fn modify_long<F: FnOnce(i64) -> i64>(&self, name: &str, f: F) -> Result<i64, AttributeError> {
        let slot = self.slot(name)?;
        let mut value = slot.value.write();
        let current = match *value {
            AttributeValue::Long(current) => current,
            ref other => {
                return Err(AttributeError::TypeMismatch {
                    attribute: name.to_string(),
                    expected: "long".to_string(),
                    found: other.attribute_type().to_string(),
                })
            }
        };
        let next = f(current);
        *value = AttributeValue::Long(next);
        Ok(next)
    }
}

impl ManagedObject for AttributeTable {
    fn info(&self) -> ManagementInfo {
        ManagementInfo {
            description: self.description.clone(),
            attributes: self.slots.iter().map(|s| s.info.clone()).collect(),
        }
    }

    fn get_attribute(&self, name: &str) -> Result<AttributeValue, AttributeError> {
        Ok(self.slot(name)?.value.read().clone())
    }

    fn set_attribute(&self, name: &str, value: AttributeValue) -> Result<(), AttributeError> {
        let slot = self.slot(name)?;
        if !slot.info.access.is_writable() {
            return Err(AttributeError::ReadOnly(name.to_string()));
        }
        check_type(&slot.info, &value)?;
        *slot.value.write() = value;
        Ok(())
    }
}

pub struct AttributeTableBuilder {
    description: String,
    slots: Vec<Slot>,
}

impl AttributeTableBuilder {
    /// Declare an attribute; its type is taken from the initial value.
    /// Declaring the same name twice replaces the earlier declaration.
    pub fn attribute<N, V>(mut self, name: N, initial: V, access: Access, description: &str) -> Self
    where
        N: Into<String>,
        V: Into<AttributeValue>,
    {
        let name = name.into();
        let initial = initial.into();
        self.slots.retain(|s| s.info.name != name);
        self.slots.push(Slot {
            info: AttributeInfo {
                name,
                attribute_type: initial.attribute_type(),
                access,
                description: description.to_string(),
            },
            value: RwLock::new(initial),
        });
        self
    }

    pub fn build(self) -> AttributeTable {
        AttributeTable {
            description: self.description,
            slots: self.slots,
        }
    }
}
