use async_trait::async_trait;

use crate::key::PrimaryKey;
use crate::table::{TableDefinition, TableDescription};
use crate::value::Item;

use super::{
    DeleteItemRequest, Page, PutItemRequest, QueryRequest, Result, ScanRequest,
    UpdateItemRequest, WriteOutcome,
};

/// Control-plane and data-plane operations of a key-value/document store.
///
/// Every call is a single request/response; implementations do not retry,
/// paginate or cache.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Creates a table. Fails if it already exists.
    async fn create_table(&self, definition: &TableDefinition) -> Result<TableDescription>;

    /// Describes a table, `None` if it does not exist.
    async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescription>>;

    /// Deletes a table. Fails if it does not exist.
    async fn delete_table(&self, table_name: &str) -> Result<()>;

    /// Creates or overwrites an item. Applied value is the prior item when
    /// requested.
    async fn put_item(
        &self,
        table_name: &str,
        request: &PutItemRequest,
    ) -> Result<WriteOutcome<Option<Item>>>;

    /// Point lookup by exact key.
    async fn get_item(&self, table_name: &str, key: &PrimaryKey) -> Result<Option<Item>>;

    /// Applies update actions. Applied value holds the requested return values.
    async fn update_item(
        &self,
        table_name: &str,
        request: &UpdateItemRequest,
    ) -> Result<WriteOutcome<Option<Item>>>;

    /// Removes an item. Applied value is the removed item when requested.
    async fn delete_item(
        &self,
        table_name: &str,
        request: &DeleteItemRequest,
    ) -> Result<WriteOutcome<Option<Item>>>;

    /// Fetches one page of items from a single partition.
    async fn query(&self, table_name: &str, request: &QueryRequest) -> Result<Page>;

    /// Fetches one page of a full-table (or segment) read.
    async fn scan(&self, table_name: &str, request: &ScanRequest) -> Result<Page>;
}
