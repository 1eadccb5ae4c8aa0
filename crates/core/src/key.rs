//! Primary keys.

use std::fmt;

use thiserror::Error;

use crate::table::{KeyAttribute, ScalarType, TableDefinition};
use crate::value::{Item, Value};

/// Key validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("missing key attribute '{0}'")]
    MissingAttribute(String),
    #[error("key attribute '{name}' must be of type {expected}, got {found}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("'{0}' is not a key attribute of this table")]
    UnexpectedAttribute(String),
}

/// The exact primary key of an item: partition key plus optional sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    pub partition: (String, Value),
    pub sort: Option<(String, Value)>,
}

impl PrimaryKey {
    /// Key for a table with a partition key only.
    pub fn partition(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            partition: (name.into(), value.into()),
            sort: None,
        }
    }

    /// Adds the sort key component.
    pub fn with_sort(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sort = Some((name.into(), value.into()));
        self
    }

    /// Key attributes as an item.
    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert(self.partition.0.clone(), self.partition.1.clone());
        if let Some((name, value)) = &self.sort {
            item.insert(name.clone(), value.clone());
        }
        item
    }

    /// Extracts the key of `item` according to `definition`.
    ///
    /// Fails when a key attribute is absent or has the wrong scalar type.
    pub fn from_item(definition: &TableDefinition, item: &Item) -> Result<Self, KeyError> {
        let partition = extract(&definition.partition_key, item)?;
        let sort = definition
            .sort_key
            .as_ref()
            .map(|sk| extract(sk, item))
            .transpose()?;
        Ok(Self { partition, sort })
    }

    /// Validates that this key matches `definition` exactly.
    pub fn validate(&self, definition: &TableDefinition) -> Result<(), KeyError> {
        let item = self.to_item();
        for name in item.keys() {
            if !definition.key_names().contains(&name.as_str()) {
                return Err(KeyError::UnexpectedAttribute(name.clone()));
            }
        }
        Self::from_item(definition, &item).map(|_| ())
    }
}

fn extract(attribute: &KeyAttribute, item: &Item) -> Result<(String, Value), KeyError> {
    let value = item
        .get(&attribute.name)
        .ok_or_else(|| KeyError::MissingAttribute(attribute.name.clone()))?;

    let matches = matches!(
        (attribute.attribute_type, value),
        (ScalarType::Number, Value::N(_)) | (ScalarType::String, Value::S(_))
    );
    if !matches {
        return Err(KeyError::WrongType {
            name: attribute.name.clone(),
            expected: attribute.attribute_type.code(),
            found: value.type_name(),
        });
    }

    Ok((attribute.name.clone(), value.clone()))
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.partition.0, self.partition.1.to_json())?;
        if let Some((name, value)) = &self.sort {
            write!(f, ", {}={}", name, value.to_json())?;
        }
        Ok(())
    }
}
