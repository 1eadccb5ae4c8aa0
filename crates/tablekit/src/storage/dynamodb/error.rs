//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `tablekit_core::storage`. A failed
//! write condition is detected per operation and never reaches these helpers.

use std::error::Error;
use std::fmt::Debug;

use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tablekit_core::storage::{StoreError, WriteOutcome, CONDITIONAL_CHECK_FAILED};

/// Map an SDK error of any operation to `StoreError::Service`.
///
/// Service errors keep the store's code and message; dispatch, timeout and
/// response errors carry the full error chain as the message.
pub fn map_sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    match err.as_service_error() {
        Some(service) => StoreError::service(
            operation,
            service.code(),
            service
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| DisplayErrorContext(service).to_string()),
        ),
        None => StoreError::service(operation, None, DisplayErrorContext(&err).to_string()),
    }
}

/// Map a request builder error (missing required field).
pub fn map_build_error(operation: &'static str, err: BuildError) -> StoreError {
    StoreError::service(operation, None, err.to_string())
}

/// The outcome reported for a `ConditionalCheckFailedException`.
pub fn condition_not_met<T>(message: Option<&str>) -> WriteOutcome<T> {
    WriteOutcome::ConditionNotMet {
        message: message.unwrap_or(CONDITIONAL_CHECK_FAILED).to_string(),
    }
}
