//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between `AttributeValue` maps and the core
//! value model. These are testable in isolation without DynamoDB access.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use aws_sdk_dynamodb::types::{self as sdk, AttributeValue};
use tablekit_core::expression::ExpressionAttributes;
use tablekit_core::storage::{Page, ReturnValues, StoreError};
use tablekit_core::table::{ScalarType, TableDescription, TableStatus};
use tablekit_core::value::{Item, Number, Value};

// ============================================================================
// Values
// ============================================================================

/// Convert a value to its DynamoDB representation.
pub fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::S(s) => AttributeValue::S(s.clone()),
        Value::N(n) => AttributeValue::N(n.to_string()),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Null => AttributeValue::Null(true),
        Value::L(items) => AttributeValue::L(items.iter().map(value_to_attribute).collect()),
        Value::M(map) => AttributeValue::M(item_to_attributes(map)),
        Value::Ss(set) => AttributeValue::Ss(set.iter().cloned().collect()),
        Value::Ns(set) => AttributeValue::Ns(set.iter().map(|n| n.to_string()).collect()),
    }
}

/// Convert a DynamoDB attribute to a value.
///
/// Binary attributes have no counterpart in the value model.
pub fn attribute_to_value(attribute: &AttributeValue) -> Result<Value, StoreError> {
    match attribute {
        AttributeValue::S(s) => Ok(Value::S(s.clone())),
        AttributeValue::N(n) => parse_number(n).map(Value::N),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::L(items) => items
            .iter()
            .map(attribute_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::L),
        AttributeValue::M(map) => attributes_to_item(map).map(Value::M),
        AttributeValue::Ss(set) => Ok(Value::Ss(set.iter().cloned().collect())),
        AttributeValue::Ns(set) => set
            .iter()
            .map(|n| parse_number(n))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Value::Ns),
        AttributeValue::B(_) | AttributeValue::Bs(_) => Err(StoreError::InvalidData(
            "binary attributes are not supported".to_string(),
        )),
        _ => Err(StoreError::InvalidData(
            "unknown attribute value type".to_string(),
        )),
    }
}

fn parse_number(text: &str) -> Result<Number, StoreError> {
    text.parse()
        .map_err(|e| StoreError::InvalidData(format!("store returned {e}")))
}

/// Convert an item to a DynamoDB attribute map.
pub fn item_to_attributes(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), value_to_attribute(value)))
        .collect()
}

/// Convert a DynamoDB attribute map to an item.
pub fn attributes_to_item(attributes: &HashMap<String, AttributeValue>) -> Result<Item, StoreError> {
    attributes
        .iter()
        .map(|(name, value)| Ok((name.clone(), attribute_to_value(value)?)))
        .collect()
}

// ============================================================================
// Expressions
// ============================================================================

/// `ExpressionAttributeNames`, omitted when empty since the store rejects
/// empty maps.
pub fn expression_names(attrs: &ExpressionAttributes) -> Option<HashMap<String, String>> {
    non_empty(attrs.names(), |name| name.clone())
}

/// `ExpressionAttributeValues`, omitted when empty.
pub fn expression_values(attrs: &ExpressionAttributes) -> Option<HashMap<String, AttributeValue>> {
    non_empty(attrs.values(), value_to_attribute)
}

fn non_empty<V, T>(map: &BTreeMap<String, V>, convert: impl Fn(&V) -> T) -> Option<HashMap<String, T>> {
    if map.is_empty() {
        return None;
    }
    Some(map.iter().map(|(k, v)| (k.clone(), convert(v))).collect())
}

pub fn to_return_value(return_values: ReturnValues) -> sdk::ReturnValue {
    match return_values {
        ReturnValues::None => sdk::ReturnValue::None,
        ReturnValues::AllOld => sdk::ReturnValue::AllOld,
        ReturnValues::UpdatedOld => sdk::ReturnValue::UpdatedOld,
        ReturnValues::AllNew => sdk::ReturnValue::AllNew,
        ReturnValues::UpdatedNew => sdk::ReturnValue::UpdatedNew,
    }
}

// ============================================================================
// Tables and pages
// ============================================================================

pub fn to_scalar_type(attribute_type: ScalarType) -> sdk::ScalarAttributeType {
    match attribute_type {
        ScalarType::Number => sdk::ScalarAttributeType::N,
        ScalarType::String => sdk::ScalarAttributeType::S,
    }
}

pub fn from_table_status(status: Option<&sdk::TableStatus>) -> TableStatus {
    match status {
        Some(sdk::TableStatus::Creating) => TableStatus::Creating,
        Some(sdk::TableStatus::Updating) => TableStatus::Updating,
        Some(sdk::TableStatus::Deleting) => TableStatus::Deleting,
        _ => TableStatus::Active,
    }
}

/// Convert the SDK's table description.
pub fn from_table_description(table_name: &str, table: &sdk::TableDescription) -> TableDescription {
    TableDescription {
        table_name: table.table_name().unwrap_or(table_name).to_string(),
        status: from_table_status(table.table_status()),
        item_count: table.item_count(),
    }
}

/// Assemble a page from the raw parts of a Query or Scan response.
pub fn to_page(
    items: Option<Vec<HashMap<String, AttributeValue>>>,
    count: i32,
    scanned_count: i32,
    last_evaluated_key: Option<HashMap<String, AttributeValue>>,
) -> Result<Page, StoreError> {
    let items = items
        .unwrap_or_default()
        .iter()
        .map(attributes_to_item)
        .collect::<Result<Vec<_>, _>>()?;
    let last_evaluated_key = last_evaluated_key
        .filter(|key| !key.is_empty())
        .map(|key| attributes_to_item(&key))
        .transpose()?;

    Ok(Page {
        items,
        count: usize::try_from(count).unwrap_or_default(),
        scanned_count: usize::try_from(scanned_count).unwrap_or_default(),
        last_evaluated_key,
    })
}
