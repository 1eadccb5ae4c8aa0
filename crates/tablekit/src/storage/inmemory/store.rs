//! In-memory table store implementation.

use std::collections::{BTreeMap, HashMap};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use tablekit_core::expression::{
    apply_update, check_between_bounds, evaluate, project, Condition, Projection,
    SortKeyCondition, UpdateAction,
};
use tablekit_core::key::PrimaryKey;
use tablekit_core::storage::{
    DeleteItemRequest, Page, PutItemRequest, QueryRequest, Result, ReturnValues, ScanRequest,
    StoreError, TableStore, UpdateItemRequest, WriteOutcome,
};
use tablekit_core::table::{ScalarType, TableDefinition, TableDescription, TableStatus};
use tablekit_core::value::{Item, Number, Value};

const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";
const RESOURCE_IN_USE: &str = "ResourceInUseException";
const MAX_TOTAL_SEGMENTS: u32 = 1_000_000;

/// A key attribute value in its sortable form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum KeyPart {
    N(Number),
    S(String),
}

impl KeyPart {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::N(n) => Some(KeyPart::N(n.clone())),
            Value::S(s) => Some(KeyPart::S(s.clone())),
            _ => None,
        }
    }
}

/// Items are kept ordered by partition key, then sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct StoredKey {
    partition: KeyPart,
    sort: Option<KeyPart>,
}

#[derive(Debug)]
struct Table {
    definition: TableDefinition,
    items: BTreeMap<StoredKey, Item>,
}

impl Table {
    fn description(&self) -> TableDescription {
        TableDescription {
            table_name: self.definition.table_name.clone(),
            status: TableStatus::Active,
            item_count: i64::try_from(self.items.len()).ok(),
        }
    }

    /// Key of a full item being written.
    fn key_of_item(&self, operation: &'static str, item: &Item) -> Result<StoredKey> {
        let key = PrimaryKey::from_item(&self.definition, item).map_err(|e| {
            StoreError::validation(
                operation,
                format!("One or more parameter values were invalid: {e}"),
            )
        })?;
        stored_key(operation, &key)
    }

    /// Key given explicitly: must name exactly the key attributes.
    fn exact_key(&self, operation: &'static str, key: &PrimaryKey) -> Result<StoredKey> {
        key.validate(&self.definition).map_err(|e| {
            StoreError::validation(
                operation,
                format!("The provided key element does not match the schema: {e}"),
            )
        })?;
        stored_key(operation, key)
    }

    fn primary_key_item(&self, item: &Item) -> Option<Item> {
        PrimaryKey::from_item(&self.definition, item)
            .ok()
            .map(|key| key.to_item())
    }
}

fn stored_key(operation: &'static str, key: &PrimaryKey) -> Result<StoredKey> {
    let invalid = || {
        StoreError::validation(
            operation,
            "One or more parameter values were invalid: key attributes must be N or S",
        )
    };
    let partition = KeyPart::from_value(&key.partition.1).ok_or_else(invalid)?;
    let sort = match &key.sort {
        Some((_, value)) => Some(KeyPart::from_value(value).ok_or_else(invalid)?),
        None => None,
    };

    let empty_string = |part: &KeyPart| matches!(part, KeyPart::S(s) if s.is_empty());
    if empty_string(&partition) || sort.as_ref().is_some_and(empty_string) {
        return Err(StoreError::validation(
            operation,
            "One or more parameter values were invalid: \
             An AttributeValue may not contain an empty string",
        ));
    }

    Ok(StoredKey { partition, sort })
}

fn not_found(operation: &'static str) -> StoreError {
    StoreError::service(
        operation,
        Some(RESOURCE_NOT_FOUND),
        "Requested resource not found",
    )
}

fn matches_type(part: &KeyPart, attribute_type: ScalarType) -> bool {
    matches!(
        (part, attribute_type),
        (KeyPart::N(_), ScalarType::Number) | (KeyPart::S(_), ScalarType::String)
    )
}

/// Validates the literal `BETWEEN` bounds of an optional expression.
fn check_expression(
    operation: &'static str,
    kind: &str,
    condition: Option<&Condition>,
) -> Result<()> {
    match condition.map(check_between_bounds) {
        Some(Err(e)) => Err(StoreError::validation(operation, format!("Invalid {kind}: {e}"))),
        _ => Ok(()),
    }
}

/// Values in a sort key condition must match the sort key's declared type.
fn check_sort_condition(
    operation: &'static str,
    condition: &SortKeyCondition,
    attribute_type: ScalarType,
) -> Result<()> {
    let check = |value: &Value| {
        KeyPart::from_value(value)
            .filter(|part| matches_type(part, attribute_type))
            .map(|_| ())
            .ok_or_else(|| {
                StoreError::validation(
                    operation,
                    "One or more parameter values were invalid: \
                     Condition parameter type does not match schema type",
                )
            })
    };

    match condition {
        SortKeyCondition::Equals(v)
        | SortKeyCondition::LessThan(v)
        | SortKeyCondition::AtMost(v)
        | SortKeyCondition::GreaterThan(v)
        | SortKeyCondition::AtLeast(v) => check(v),
        SortKeyCondition::Between(low, high) => {
            check(low)?;
            check(high)
        }
        SortKeyCondition::BeginsWith(_) if attribute_type != ScalarType::String => {
            Err(StoreError::validation(
                operation,
                "Invalid KeyConditionExpression: Incorrect operand type for operator \
                 or function; operator or function: begins_with, operand type: N",
            ))
        }
        SortKeyCondition::BeginsWith(_) => Ok(()),
    }
}

/// Numbers written to the table must be within the store's limits.
fn check_written_numbers<'a>(
    operation: &'static str,
    values: impl IntoIterator<Item = &'a Value>,
) -> Result<()> {
    values
        .into_iter()
        .try_for_each(Value::check_numbers)
        .map_err(|e| {
            StoreError::validation(
                operation,
                format!("One or more parameter values were invalid: {e}"),
            )
        })
}

fn segment_of(key: &StoredKey, total_segments: u32) -> u32 {
    let mut hasher = DefaultHasher::new();
    key.partition.hash(&mut hasher);
    (hasher.finish() % u64::from(total_segments)) as u32
}

/// Paths touched by an update, for `UPDATED_OLD` / `UPDATED_NEW`.
fn updated_paths(actions: &[UpdateAction], include_removed: bool) -> Projection {
    Projection(
        actions
            .iter()
            .filter(|action| include_removed || matches!(action, UpdateAction::Set(..)))
            .map(|action| action.path().clone())
            .collect(),
    )
}

fn non_empty(item: Item) -> Option<Item> {
    (!item.is_empty()).then_some(item)
}

/// Reads up to `limit` entries, applies the filter after the read and records
/// the continuation key when entries remain.
fn read_page<'a>(
    table: &Table,
    entries: impl Iterator<Item = &'a Item>,
    limit: Option<u32>,
    filter: Option<&Condition>,
    projection: Option<&Projection>,
) -> Page {
    let limit = limit.map_or(usize::MAX, |l| l as usize);
    let mut entries = entries.peekable();
    let mut page = Page::default();
    let mut last_read = None;

    while page.scanned_count < limit {
        let Some(item) = entries.next() else {
            break;
        };
        page.scanned_count += 1;
        last_read = Some(item);

        if filter.is_none_or(|f| evaluate(f, item)) {
            page.items.push(match projection {
                Some(p) if !p.is_empty() => project(item, p),
                _ => item.clone(),
            });
        }
    }

    if entries.peek().is_some() {
        page.last_evaluated_key = last_read.and_then(|item| table.primary_key_item(item));
    }
    page.count = page.items.len();
    page
}

/// In-memory table store.
///
/// Uses a `HashMap` of tables wrapped in `Arc<RwLock<_>>`; clones share the
/// same tables. Tables are ACTIVE as soon as they are created.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryStore {
    /// Creates a new store without tables.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn create_table(&self, definition: &TableDefinition) -> Result<TableDescription> {
        const OP: &str = "CreateTable";
        debug!(table = %definition.table_name, "CreateTable (memory)");

        if definition.throughput.read_capacity_units < 1
            || definition.throughput.write_capacity_units < 1
        {
            return Err(StoreError::validation(
                OP,
                "Provisioned throughput units must be at least 1",
            ));
        }

        let mut tables = self.tables.write().await;
        if tables.contains_key(&definition.table_name) {
            return Err(StoreError::service(
                OP,
                Some(RESOURCE_IN_USE),
                format!("Table already exists: {}", definition.table_name),
            ));
        }

        let table = Table {
            definition: definition.clone(),
            items: BTreeMap::new(),
        };
        let description = table.description();
        tables.insert(definition.table_name.clone(), table);
        Ok(description)
    }

    async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescription>> {
        debug!(table = %table_name, "DescribeTable (memory)");
        let tables = self.tables.read().await;
        Ok(tables.get(table_name).map(Table::description))
    }

    async fn delete_table(&self, table_name: &str) -> Result<()> {
        debug!(table = %table_name, "DeleteTable (memory)");
        let mut tables = self.tables.write().await;
        tables
            .remove(table_name)
            .map(|_| ())
            .ok_or_else(|| not_found("DeleteTable"))
    }

    async fn put_item(
        &self,
        table_name: &str,
        request: &PutItemRequest,
    ) -> Result<WriteOutcome<Option<Item>>> {
        const OP: &str = "PutItem";
        debug!(table = %table_name, "PutItem (memory)");
        let mut tables = self.tables.write().await;
        let table = tables.get_mut(table_name).ok_or_else(|| not_found(OP))?;
        let key = table.key_of_item(OP, &request.item)?;
        check_written_numbers(OP, request.item.values())?;
        check_expression(OP, "ConditionExpression", request.condition.as_ref())?;

        if let Some(condition) = &request.condition {
            let empty = Item::new();
            let current = table.items.get(&key).unwrap_or(&empty);
            if !evaluate(condition, current) {
                return Ok(WriteOutcome::condition_not_met());
            }
        }

        let old = table.items.insert(key, request.item.clone());
        Ok(WriteOutcome::Applied(old.filter(|_| request.return_old)))
    }

    async fn get_item(&self, table_name: &str, key: &PrimaryKey) -> Result<Option<Item>> {
        const OP: &str = "GetItem";
        debug!(table = %table_name, %key, "GetItem (memory)");
        let tables = self.tables.read().await;
        let table = tables.get(table_name).ok_or_else(|| not_found(OP))?;
        let key = table.exact_key(OP, key)?;
        Ok(table.items.get(&key).cloned())
    }

    async fn update_item(
        &self,
        table_name: &str,
        request: &UpdateItemRequest,
    ) -> Result<WriteOutcome<Option<Item>>> {
        const OP: &str = "UpdateItem";
        debug!(table = %table_name, key = %request.key, "UpdateItem (memory)");
        let mut tables = self.tables.write().await;
        let table = tables.get_mut(table_name).ok_or_else(|| not_found(OP))?;
        let key = table.exact_key(OP, &request.key)?;

        if request.actions.is_empty() {
            return Err(StoreError::validation(
                OP,
                "Invalid UpdateExpression: The expression can not be empty;",
            ));
        }
        check_written_numbers(
            OP,
            request.actions.iter().filter_map(|action| match action {
                UpdateAction::Set(_, value) => Some(value),
                UpdateAction::Remove(_) => None,
            }),
        )?;
        check_expression(OP, "ConditionExpression", request.condition.as_ref())?;

        let key_names = table.definition.key_names();
        if let Some(action) = request
            .actions
            .iter()
            .find(|action| key_names.contains(&action.path().root()))
        {
            return Err(StoreError::validation(
                OP,
                format!(
                    "Cannot update attribute {}. This attribute is part of the key",
                    action.path().root()
                ),
            ));
        }

        let existing = table.items.get(&key).cloned();
        if let Some(condition) = &request.condition {
            let current = existing.clone().unwrap_or_default();
            if !evaluate(condition, &current) {
                return Ok(WriteOutcome::condition_not_met());
            }
        }

        let mut updated = existing.clone().unwrap_or_else(|| request.key.to_item());
        apply_update(&mut updated, &request.actions)
            .map_err(|e| StoreError::validation(OP, e.to_string()))?;
        table.items.insert(key, updated.clone());

        let returned = match request.return_values {
            ReturnValues::None => None,
            ReturnValues::AllOld => existing,
            ReturnValues::AllNew => Some(updated),
            ReturnValues::UpdatedOld => existing
                .map(|old| project(&old, &updated_paths(&request.actions, true)))
                .and_then(non_empty),
            ReturnValues::UpdatedNew => {
                non_empty(project(&updated, &updated_paths(&request.actions, false)))
            }
        };
        Ok(WriteOutcome::Applied(returned))
    }

    async fn delete_item(
        &self,
        table_name: &str,
        request: &DeleteItemRequest,
    ) -> Result<WriteOutcome<Option<Item>>> {
        const OP: &str = "DeleteItem";
        debug!(table = %table_name, key = %request.key, "DeleteItem (memory)");
        let mut tables = self.tables.write().await;
        let table = tables.get_mut(table_name).ok_or_else(|| not_found(OP))?;
        let key = table.exact_key(OP, &request.key)?;
        check_expression(OP, "ConditionExpression", request.condition.as_ref())?;

        if let Some(condition) = &request.condition {
            let empty = Item::new();
            let current = table.items.get(&key).unwrap_or(&empty);
            if !evaluate(condition, current) {
                return Ok(WriteOutcome::condition_not_met());
            }
        }

        let old = table.items.remove(&key);
        Ok(WriteOutcome::Applied(old.filter(|_| request.return_old)))
    }

    async fn query(&self, table_name: &str, request: &QueryRequest) -> Result<Page> {
        const OP: &str = "Query";
        debug!(table = %table_name, "Query (memory)");
        let tables = self.tables.read().await;
        let table = tables.get(table_name).ok_or_else(|| not_found(OP))?;
        let definition = &table.definition;

        if request.limit == Some(0) {
            return Err(StoreError::validation(OP, "Limit must be at least 1"));
        }

        let (pk_name, pk_value) = &request.key_condition.partition;
        if *pk_name != definition.partition_key.name {
            return Err(StoreError::validation(
                OP,
                format!(
                    "Query condition missed key schema element: {}",
                    definition.partition_key.name
                ),
            ));
        }
        let partition = KeyPart::from_value(pk_value)
            .filter(|part| matches_type(part, definition.partition_key.attribute_type))
            .ok_or_else(|| {
                StoreError::validation(
                    OP,
                    "One or more parameter values were invalid: \
                     Condition parameter type does not match schema type",
                )
            })?;
        if let Some((sk_name, sort)) = &request.key_condition.sort {
            let Some(sort_key) = definition.sort_key.as_ref().filter(|sk| &sk.name == sk_name)
            else {
                return Err(StoreError::validation(
                    OP,
                    format!("Query key condition not supported: {sk_name} is not the sort key"),
                ));
            };
            check_sort_condition(OP, sort, sort_key.attribute_type)?;
        }
        let condition = request.key_condition.to_condition();
        check_expression(OP, "KeyConditionExpression", Some(&condition))?;

        let start = request
            .exclusive_start_key
            .as_ref()
            .map(|key| table.key_of_item(OP, key))
            .transpose()?;

        let mut matching: Vec<(&StoredKey, &Item)> = table
            .items
            .iter()
            .filter(|(key, _)| key.partition == partition)
            .filter(|(_, item)| evaluate(&condition, item))
            .collect();
        if !request.scan_forward {
            matching.reverse();
        }

        let forward = request.scan_forward;
        let entries = matching
            .into_iter()
            .filter(|(key, _)| match &start {
                None => true,
                Some(start) if forward => *key > start,
                Some(start) => *key < start,
            })
            .map(|(_, item)| item);

        Ok(read_page(
            table,
            entries,
            request.limit,
            None,
            request.projection.as_ref(),
        ))
    }

    async fn scan(&self, table_name: &str, request: &ScanRequest) -> Result<Page> {
        const OP: &str = "Scan";
        debug!(table = %table_name, "Scan (memory)");
        let tables = self.tables.read().await;
        let table = tables.get(table_name).ok_or_else(|| not_found(OP))?;

        if request.limit == Some(0) {
            return Err(StoreError::validation(OP, "Limit must be at least 1"));
        }
        if let Some(segment) = request.segment {
            if segment.total_segments == 0 || segment.total_segments > MAX_TOTAL_SEGMENTS {
                return Err(StoreError::validation(
                    OP,
                    format!("TotalSegments must be between 1 and {MAX_TOTAL_SEGMENTS}"),
                ));
            }
            if segment.segment >= segment.total_segments {
                return Err(StoreError::validation(
                    OP,
                    "Segment must be less than TotalSegments",
                ));
            }
        }
        check_expression(OP, "FilterExpression", request.filter.as_ref())?;

        let start = request
            .exclusive_start_key
            .as_ref()
            .map(|key| table.key_of_item(OP, key))
            .transpose()?;

        let entries = table
            .items
            .iter()
            .filter(|(key, _)| start.as_ref().is_none_or(|start| *key > start))
            .filter(|(key, _)| {
                request.segment.is_none_or(|s| {
                    segment_of(key, s.total_segments) == s.segment
                })
            })
            .map(|(_, item)| item);

        Ok(read_page(
            table,
            entries,
            request.limit,
            request.filter.as_ref(),
            request.projection.as_ref(),
        ))
    }
}
