//! Named table operations.
//!
//! Each function issues the store calls of one demonstration routine through
//! an injected `TableStore`. Unmet write conditions are logged and returned as
//! outcomes; every other failure propagates.

use std::time::Duration;

use tablekit_core::expression::{KeyCondition, Path, Projection, SortKeyCondition, UpdateAction};
use tablekit_core::key::PrimaryKey;
use tablekit_core::storage::{
    DeleteItemRequest, Page, PutItemRequest, QueryRequest, ReturnValues, ScanRequest,
    TableStore, UpdateItemRequest, WriteOutcome,
};
use tablekit_core::table::{TableDefinition, TableDescription, TableStatus};
use tablekit_core::value::{Item, Number, Value};
use tracing::{info, warn};

use crate::error::{AppError, Result};

/// Polling policy for [`wait_for_table_active`].
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            attempts: 60,
            interval: Duration::from_secs(2),
        }
    }
}

/// Creates the table.
pub async fn create_table(
    store: &dyn TableStore,
    definition: &TableDefinition,
) -> Result<TableDescription> {
    let description = store.create_table(definition).await?;
    info!(table = %description.table_name, status = %description.status, "created table");
    Ok(description)
}

/// Polls until the table reports ACTIVE.
pub async fn wait_for_table_active(
    store: &dyn TableStore,
    table_name: &str,
    policy: WaitPolicy,
) -> Result<TableDescription> {
    for attempt in 0..policy.attempts {
        match store.describe_table(table_name).await? {
            Some(description) if description.status == TableStatus::Active => {
                return Ok(description);
            }
            Some(_) => {}
            None => {
                return Err(AppError::TableNotFound {
                    table_name: table_name.to_string(),
                })
            }
        }
        if attempt + 1 < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(AppError::TableActivationTimeout {
        table_name: table_name.to_string(),
    })
}

/// Deletes the table.
pub async fn delete_table(store: &dyn TableStore, table_name: &str) -> Result<()> {
    store.delete_table(table_name).await?;
    info!(table = %table_name, "deleted table");
    Ok(())
}

/// Writes an item unconditionally.
pub async fn put_movie(store: &dyn TableStore, table_name: &str, item: Item) -> Result<()> {
    store.put_item(table_name, &PutItemRequest::new(item)).await?;
    info!(table = %table_name, "put item");
    Ok(())
}

/// The rating, plot and cast written by [`update_movie_details`].
pub fn movie_details_update() -> Vec<UpdateAction> {
    let info = Path::attribute("info");
    vec![
        UpdateAction::Set(
            info.clone().child("rating"),
            Value::N(Number::from_scaled(35, 1)),
        ),
        UpdateAction::Set(
            info.clone().child("plot"),
            "Everything happens all at once.".into(),
        ),
        UpdateAction::Set(
            info.child("actors"),
            Value::L(vec!["David".into(), "Alex".into(), "Chiran".into()]),
        ),
    ]
}

/// Sets `info.rating`, `info.plot` and `info.actors`; returns the updated
/// attributes.
pub async fn update_movie_details(
    store: &dyn TableStore,
    table_name: &str,
    key: &PrimaryKey,
) -> Result<Option<Item>> {
    let request = UpdateItemRequest::new(key.clone(), movie_details_update())
        .returning(ReturnValues::UpdatedNew);
    let outcome = store.update_item(table_name, &request).await?;
    Ok(report(outcome, "UpdateItem", key).flatten())
}

/// Removes the first actor if the movie lists at least three.
pub async fn remove_first_actor(
    store: &dyn TableStore,
    table_name: &str,
    key: &PrimaryKey,
) -> Result<WriteOutcome<Option<Item>>> {
    let actors = Path::attribute("info").child("actors");
    let remove = vec![UpdateAction::Remove(actors.clone().index(0))];
    let request = UpdateItemRequest::new(key.clone(), remove)
        .with_condition(actors.size().ge(3))
        .returning(ReturnValues::UpdatedNew);

    let outcome = store.update_item(table_name, &request).await?;
    report(outcome.clone(), "UpdateItem", key);
    Ok(outcome)
}

/// Point lookup.
pub async fn get_movie(
    store: &dyn TableStore,
    table_name: &str,
    key: &PrimaryKey,
) -> Result<Option<Item>> {
    Ok(store.get_item(table_name, key).await?)
}

/// Deletes the movie if `info.rating <= max_rating`.
pub async fn delete_movie_if_rated_at_most(
    store: &dyn TableStore,
    table_name: &str,
    key: &PrimaryKey,
    max_rating: Number,
) -> Result<WriteOutcome<Option<Item>>> {
    let request = DeleteItemRequest::new(key.clone())
        .with_condition(Path::attribute("info").child("rating").le(max_rating));

    let outcome = store.delete_item(table_name, &request).await?;
    report(outcome.clone(), "DeleteItem", key);
    Ok(outcome)
}

fn report<T>(outcome: WriteOutcome<T>, operation: &str, key: &PrimaryKey) -> Option<T> {
    match outcome {
        WriteOutcome::Applied(value) => {
            info!(%key, operation, "write applied");
            Some(value)
        }
        WriteOutcome::ConditionNotMet { message } => {
            warn!(%key, operation, %message, "condition not met");
            None
        }
    }
}

/// All movies of one year.
pub fn movies_of_year(year: i64) -> QueryRequest {
    QueryRequest::new(KeyCondition::partition_equals("year", year))
}

/// Movies of one year whose titles fall in `[from, to]`, projected to
/// `year, title, info.genres, info.actors[0]`.
pub fn movies_of_year_in_title_range(year: i64, from: &str, to: &str) -> QueryRequest {
    QueryRequest::new(KeyCondition::partition_equals("year", year).with_sort(
        "title",
        SortKeyCondition::Between(from.into(), to.into()),
    ))
    .with_projection(Projection(vec![
        Path::attribute("year"),
        Path::attribute("title"),
        Path::attribute("info").child("genres"),
        Path::attribute("info").child("actors").index(0),
    ]))
}

/// Movies released in `[from, to]`, projected to `year, title, info.rating`.
/// The filter runs after the read, so every item is read.
pub fn movies_released_between(from: i64, to: i64) -> ScanRequest {
    ScanRequest::new()
        .with_filter(Path::attribute("year").between(from, to))
        .with_projection(Projection(vec![
            Path::attribute("year"),
            Path::attribute("title"),
            Path::attribute("info").child("rating"),
        ]))
}

/// Runs a query. With `all_pages`, follows continuation keys and merges pages.
pub async fn query(
    store: &dyn TableStore,
    table_name: &str,
    request: QueryRequest,
    all_pages: bool,
) -> Result<Page> {
    let mut request = request;
    let mut merged = Page::default();
    loop {
        let page = store.query(table_name, &request).await?;
        let next = merge_page(&mut merged, page);
        match next {
            Some(key) if all_pages => request.exclusive_start_key = Some(key),
            _ => return Ok(merged),
        }
    }
}

/// Runs a scan. With `all_pages`, follows continuation keys and merges pages.
pub async fn scan(
    store: &dyn TableStore,
    table_name: &str,
    request: ScanRequest,
    all_pages: bool,
) -> Result<Page> {
    let mut request = request;
    let mut merged = Page::default();
    loop {
        let page = store.scan(table_name, &request).await?;
        let next = merge_page(&mut merged, page);
        match next {
            Some(key) if all_pages => request.exclusive_start_key = Some(key),
            _ => return Ok(merged),
        }
    }
}

/// Appends `page` to `merged` and returns the continuation key.
fn merge_page(merged: &mut Page, page: Page) -> Option<Item> {
    merged.items.extend(page.items);
    merged.count += page.count;
    merged.scanned_count += page.scanned_count;
    merged.last_evaluated_key = page.last_evaluated_key.clone();
    page.last_evaluated_key
}
