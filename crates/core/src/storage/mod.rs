mod error;
mod traits;
mod types;

pub use error::{Result, StoreError, VALIDATION_EXCEPTION};
pub use traits::TableStore;
pub use types::{
    DeleteItemRequest, Page, PutItemRequest, QueryRequest, ReturnValues, ScanRequest, Segment,
    UpdateItemRequest, WriteOutcome, CONDITIONAL_CHECK_FAILED,
};
