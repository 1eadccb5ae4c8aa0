//! Storage backends implementing `tablekit_core::storage::TableStore`.
//!
//! - `dynamodb`: AWS DynamoDB (or DynamoDB Local) through `aws-sdk-dynamodb`
//! - `inmemory`: process-local tables with the same observable semantics

pub mod dynamodb;
pub mod inmemory;

pub use dynamodb::DynamoDbStore;
pub use inmemory::InMemoryStore;
