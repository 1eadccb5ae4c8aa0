//! DynamoDB storage backend.
//!
//! Implements `TableStore` using `aws-sdk-dynamodb`. Conversions and error
//! mapping are pure functions so they can be tested without a network.

mod conversions;
mod error;
mod store;

pub use store::DynamoDbStore;
