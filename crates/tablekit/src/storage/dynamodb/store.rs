//! DynamoDB table store.
//!
//! Implements `TableStore` from `tablekit_core::storage` with one SDK call per
//! operation. Expressions are rendered to placeholder form here.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{self as sdk, AttributeValue};
use aws_sdk_dynamodb::Client;
use tracing::debug;

use tablekit_core::expression::ExpressionAttributes;
use tablekit_core::key::PrimaryKey;
use tablekit_core::storage::{
    DeleteItemRequest, Page, PutItemRequest, QueryRequest, Result, ReturnValues, ScanRequest,
    TableStore, UpdateItemRequest, WriteOutcome,
};
use tablekit_core::table::{TableDefinition, TableDescription, TableStatus};
use tablekit_core::value::Item;

use super::conversions::{
    attributes_to_item, expression_names, expression_values, from_table_description,
    item_to_attributes, to_page, to_return_value, to_scalar_type,
};
use super::error::{condition_not_met, map_build_error, map_sdk_error};

/// DynamoDB-based table store.
///
/// Owns the SDK client; constructed once in `main` and passed to every
/// operation.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    /// Creates a new store with the given DynamoDB client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn returned_item(attributes: Option<HashMap<String, AttributeValue>>) -> Result<Option<Item>> {
    attributes
        .filter(|attrs| !attrs.is_empty())
        .map(|attrs| attributes_to_item(&attrs))
        .transpose()
}

fn to_limit(limit: Option<u32>) -> Option<i32> {
    limit.map(|l| i32::try_from(l).unwrap_or(i32::MAX))
}

fn to_segment(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn key_schema(
    definition: &TableDefinition,
) -> Result<(Vec<sdk::KeySchemaElement>, Vec<sdk::AttributeDefinition>)> {
    let op = "CreateTable";
    let mut key_schema = Vec::new();
    let mut attribute_definitions = Vec::new();

    let keys = std::iter::once((&definition.partition_key, sdk::KeyType::Hash)).chain(
        definition
            .sort_key
            .iter()
            .map(|sk| (sk, sdk::KeyType::Range)),
    );
    for (attribute, key_type) in keys {
        key_schema.push(
            sdk::KeySchemaElement::builder()
                .attribute_name(&attribute.name)
                .key_type(key_type)
                .build()
                .map_err(|e| map_build_error(op, e))?,
        );
        attribute_definitions.push(
            sdk::AttributeDefinition::builder()
                .attribute_name(&attribute.name)
                .attribute_type(to_scalar_type(attribute.attribute_type))
                .build()
                .map_err(|e| map_build_error(op, e))?,
        );
    }

    Ok((key_schema, attribute_definitions))
}

#[async_trait]
impl TableStore for DynamoDbStore {
    async fn create_table(&self, definition: &TableDefinition) -> Result<TableDescription> {
        debug!(table = %definition.table_name, "CreateTable");
        let (key_schema, attribute_definitions) = key_schema(definition)?;
        let throughput = sdk::ProvisionedThroughput::builder()
            .read_capacity_units(definition.throughput.read_capacity_units)
            .write_capacity_units(definition.throughput.write_capacity_units)
            .build()
            .map_err(|e| map_build_error("CreateTable", e))?;

        let output = self
            .client
            .create_table()
            .table_name(&definition.table_name)
            .set_key_schema(Some(key_schema))
            .set_attribute_definitions(Some(attribute_definitions))
            .provisioned_throughput(throughput)
            .send()
            .await
            .map_err(|e| map_sdk_error("CreateTable", e))?;

        Ok(match output.table_description() {
            Some(table) => from_table_description(&definition.table_name, table),
            None => TableDescription {
                table_name: definition.table_name.clone(),
                status: TableStatus::Creating,
                item_count: None,
            },
        })
    }

    async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescription>> {
        debug!(table = %table_name, "DescribeTable");
        match self.client.describe_table().table_name(table_name).send().await {
            Ok(output) => Ok(output
                .table()
                .map(|table| from_table_description(table_name, table))),
            Err(err) => {
                if let Some(DescribeTableError::ResourceNotFoundException(_)) =
                    err.as_service_error()
                {
                    return Ok(None);
                }
                Err(map_sdk_error("DescribeTable", err))
            }
        }
    }

    async fn delete_table(&self, table_name: &str) -> Result<()> {
        debug!(table = %table_name, "DeleteTable");
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_sdk_error("DeleteTable", e))?;
        Ok(())
    }

    async fn put_item(
        &self,
        table_name: &str,
        request: &PutItemRequest,
    ) -> Result<WriteOutcome<Option<Item>>> {
        debug!(table = %table_name, "PutItem");
        let mut attrs = ExpressionAttributes::new();
        let condition = request
            .condition
            .as_ref()
            .map(|c| attrs.render_condition(c));
        let return_value = if request.return_old {
            sdk::ReturnValue::AllOld
        } else {
            sdk::ReturnValue::None
        };

        let result = self
            .client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item_to_attributes(&request.item)))
            .set_condition_expression(condition)
            .set_expression_attribute_names(expression_names(&attrs))
            .set_expression_attribute_values(expression_values(&attrs))
            .return_values(return_value)
            .send()
            .await;

        match result {
            Ok(output) => Ok(WriteOutcome::Applied(returned_item(output.attributes)?)),
            Err(err) => {
                if let Some(PutItemError::ConditionalCheckFailedException(e)) =
                    err.as_service_error()
                {
                    return Ok(condition_not_met(e.message()));
                }
                Err(map_sdk_error("PutItem", err))
            }
        }
    }

    async fn get_item(&self, table_name: &str, key: &PrimaryKey) -> Result<Option<Item>> {
        debug!(table = %table_name, %key, "GetItem");
        let output = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(item_to_attributes(&key.to_item())))
            .send()
            .await
            .map_err(|e| map_sdk_error("GetItem", e))?;

        output.item.map(|item| attributes_to_item(&item)).transpose()
    }

    async fn update_item(
        &self,
        table_name: &str,
        request: &UpdateItemRequest,
    ) -> Result<WriteOutcome<Option<Item>>> {
        debug!(table = %table_name, key = %request.key, "UpdateItem");
        let mut attrs = ExpressionAttributes::new();
        let update = attrs.render_update(&request.actions);
        let condition = request
            .condition
            .as_ref()
            .map(|c| attrs.render_condition(c));

        let result = self
            .client
            .update_item()
            .table_name(table_name)
            .set_key(Some(item_to_attributes(&request.key.to_item())))
            .update_expression(update)
            .set_condition_expression(condition)
            .set_expression_attribute_names(expression_names(&attrs))
            .set_expression_attribute_values(expression_values(&attrs))
            .return_values(to_return_value(request.return_values))
            .send()
            .await;

        match result {
            Ok(output) => {
                let returned = match request.return_values {
                    ReturnValues::None => None,
                    _ => returned_item(output.attributes)?,
                };
                Ok(WriteOutcome::Applied(returned))
            }
            Err(err) => {
                if let Some(UpdateItemError::ConditionalCheckFailedException(e)) =
                    err.as_service_error()
                {
                    return Ok(condition_not_met(e.message()));
                }
                Err(map_sdk_error("UpdateItem", err))
            }
        }
    }

    async fn delete_item(
        &self,
        table_name: &str,
        request: &DeleteItemRequest,
    ) -> Result<WriteOutcome<Option<Item>>> {
        debug!(table = %table_name, key = %request.key, "DeleteItem");
        let mut attrs = ExpressionAttributes::new();
        let condition = request
            .condition
            .as_ref()
            .map(|c| attrs.render_condition(c));
        let return_value = if request.return_old {
            sdk::ReturnValue::AllOld
        } else {
            sdk::ReturnValue::None
        };

        let result = self
            .client
            .delete_item()
            .table_name(table_name)
            .set_key(Some(item_to_attributes(&request.key.to_item())))
            .set_condition_expression(condition)
            .set_expression_attribute_names(expression_names(&attrs))
            .set_expression_attribute_values(expression_values(&attrs))
            .return_values(return_value)
            .send()
            .await;

        match result {
            Ok(output) => Ok(WriteOutcome::Applied(returned_item(output.attributes)?)),
            Err(err) => {
                if let Some(DeleteItemError::ConditionalCheckFailedException(e)) =
                    err.as_service_error()
                {
                    return Ok(condition_not_met(e.message()));
                }
                Err(map_sdk_error("DeleteItem", err))
            }
        }
    }

    async fn query(&self, table_name: &str, request: &QueryRequest) -> Result<Page> {
        debug!(table = %table_name, "Query");
        let mut attrs = ExpressionAttributes::new();
        let key_condition = attrs.render_key_condition(&request.key_condition);
        let projection = request
            .projection
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(|p| attrs.render_projection(p));

        let output = self
            .client
            .query()
            .table_name(table_name)
            .key_condition_expression(key_condition)
            .set_projection_expression(projection)
            .set_expression_attribute_names(expression_names(&attrs))
            .set_expression_attribute_values(expression_values(&attrs))
            .set_limit(to_limit(request.limit))
            .set_exclusive_start_key(request.exclusive_start_key.as_ref().map(item_to_attributes))
            .scan_index_forward(request.scan_forward)
            .send()
            .await
            .map_err(|e| map_sdk_error("Query", e))?;

        let (count, scanned_count) = (output.count(), output.scanned_count());
        to_page(output.items, count, scanned_count, output.last_evaluated_key)
    }

    async fn scan(&self, table_name: &str, request: &ScanRequest) -> Result<Page> {
        debug!(table = %table_name, "Scan");
        let mut attrs = ExpressionAttributes::new();
        let filter = request.filter.as_ref().map(|f| attrs.render_condition(f));
        let projection = request
            .projection
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(|p| attrs.render_projection(p));

        let output = self
            .client
            .scan()
            .table_name(table_name)
            .set_filter_expression(filter)
            .set_projection_expression(projection)
            .set_expression_attribute_names(expression_names(&attrs))
            .set_expression_attribute_values(expression_values(&attrs))
            .set_limit(to_limit(request.limit))
            .set_segment(request.segment.map(|s| to_segment(s.segment)))
            .set_total_segments(request.segment.map(|s| to_segment(s.total_segments)))
            .set_exclusive_start_key(request.exclusive_start_key.as_ref().map(item_to_attributes))
            .send()
            .await
            .map_err(|e| map_sdk_error("Scan", e))?;

        let (count, scanned_count) = (output.count(), output.scanned_count());
        to_page(output.items, count, scanned_count, output.last_evaluated_key)
    }
}
