use crate::expression::{Condition, KeyCondition, Projection, UpdateAction};
use crate::key::PrimaryKey;
use crate::value::Item;

/// Message used when the store does not supply one for an unmet condition.
pub const CONDITIONAL_CHECK_FAILED: &str = "The conditional request failed";

/// Result of a write that may carry a condition.
///
/// An unmet condition is an expected outcome, not an error: the item was left
/// untouched and the caller decides how to continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    /// The write was applied.
    Applied(T),
    /// The condition evaluated to false; nothing was written.
    ConditionNotMet { message: String },
}

impl<T> WriteOutcome<T> {
    pub fn condition_not_met() -> Self {
        WriteOutcome::ConditionNotMet {
            message: CONDITIONAL_CHECK_FAILED.to_string(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied(_))
    }

    /// The applied value, or `None` when the condition was not met.
    pub fn applied(self) -> Option<T> {
        match self {
            WriteOutcome::Applied(value) => Some(value),
            WriteOutcome::ConditionNotMet { .. } => None,
        }
    }
}

/// Which attributes an update returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnValues {
    #[default]
    None,
    AllOld,
    UpdatedOld,
    AllNew,
    UpdatedNew,
}

impl ReturnValues {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnValues::None => "NONE",
            ReturnValues::AllOld => "ALL_OLD",
            ReturnValues::UpdatedOld => "UPDATED_OLD",
            ReturnValues::AllNew => "ALL_NEW",
            ReturnValues::UpdatedNew => "UPDATED_NEW",
        }
    }
}

/// Create or fully overwrite an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutItemRequest {
    pub item: Item,
    pub condition: Option<Condition>,
    /// Return the item that was overwritten, if any.
    pub return_old: bool,
}

impl PutItemRequest {
    pub fn new(item: Item) -> Self {
        Self {
            item,
            condition: None,
            return_old: false,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn returning_old(mut self) -> Self {
        self.return_old = true;
        self
    }
}

/// Partial update of an item addressed by its exact key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateItemRequest {
    pub key: PrimaryKey,
    pub actions: Vec<UpdateAction>,
    /// Evaluated against the stored item before any action is applied.
    pub condition: Option<Condition>,
    pub return_values: ReturnValues,
}

impl UpdateItemRequest {
    pub fn new(key: PrimaryKey, actions: Vec<UpdateAction>) -> Self {
        Self {
            key,
            actions,
            condition: None,
            return_values: ReturnValues::None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn returning(mut self, return_values: ReturnValues) -> Self {
        self.return_values = return_values;
        self
    }
}

/// Removal of an item addressed by its exact key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteItemRequest {
    pub key: PrimaryKey,
    pub condition: Option<Condition>,
    pub return_old: bool,
}

impl DeleteItemRequest {
    pub fn new(key: PrimaryKey) -> Self {
        Self {
            key,
            condition: None,
            return_old: false,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn returning_old(mut self) -> Self {
        self.return_old = true;
        self
    }
}

/// A single-page query on one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub key_condition: KeyCondition,
    pub projection: Option<Projection>,
    pub limit: Option<u32>,
    /// Continue after this key (the previous page's `last_evaluated_key`).
    pub exclusive_start_key: Option<Item>,
    /// Ascending sort-key order when true.
    pub scan_forward: bool,
}

impl QueryRequest {
    pub fn new(key_condition: KeyCondition) -> Self {
        Self {
            key_condition,
            projection: None,
            limit: None,
            exclusive_start_key: None,
            scan_forward: true,
        }
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn starting_after(mut self, key: Option<Item>) -> Self {
        self.exclusive_start_key = key;
        self
    }

    pub fn descending(mut self) -> Self {
        self.scan_forward = false;
        self
    }
}

/// A parallel-scan segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub segment: u32,
    pub total_segments: u32,
}

/// A single-page scan. The filter runs after the read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRequest {
    pub filter: Option<Condition>,
    pub projection: Option<Projection>,
    pub segment: Option<Segment>,
    /// Maximum number of items to read (before filtering).
    pub limit: Option<u32>,
    pub exclusive_start_key: Option<Item>,
}

impl ScanRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Condition) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_segment(mut self, segment: u32, total_segments: u32) -> Self {
        self.segment = Some(Segment {
            segment,
            total_segments,
        });
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn starting_after(mut self, key: Option<Item>) -> Self {
        self.exclusive_start_key = key;
        self
    }
}

/// One page of query or scan results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Items returned after filtering.
    pub count: usize,
    /// Items read before filtering; drives consumed capacity.
    pub scanned_count: usize,
    /// Present when more results exist.
    pub last_evaluated_key: Option<Item>,
}
